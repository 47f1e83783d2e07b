//! Upstream completion API integration

mod openai_compat;

use thiserror::Error;

pub use openai_compat::OpenAICompatProvider;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status
    #[error("Upstream rejected request with HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// Success status, but the completion shape is missing
    #[error("Invalid response: {0}")]
    MalformedResponse(String),

    #[error("Upstream request timed out")]
    Timeout,

    /// Network or decoding failure before a usable response existed
    #[error("Request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}
