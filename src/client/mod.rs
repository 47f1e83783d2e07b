//! Relay client used by the conversation store
//!
//! [`RelayClient`] is the seam between a [`ConversationStore`] and the relay
//! endpoint. [`HttpRelayClient`] talks to a running relay over HTTP; tests
//! substitute their own implementation.
//!
//! [`ConversationStore`]: crate::conversation::ConversationStore

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::conversation::Message;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay answered with a failure status; `message` is its user-facing text
    #[error("Relay returned HTTP {status}: {message}")]
    Relay { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    MalformedResponse(String),
}

/// Sends a conversation to the relay and returns the assistant's reply
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn send(&self, messages: &[Message]) -> Result<String, ClientError>;
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct RelayReply {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Relay client over HTTP (`POST {relay_url}/api/chat`)
pub struct HttpRelayClient {
    client: Client,
    endpoint: String,
}

impl HttpRelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/chat", relay_url.trim_end_matches('/')),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.relay_url)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, messages: &[Message]) -> Result<String, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RelayRequest { messages })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let reply = serde_json::from_str::<RelayReply>(&body);

        if !status.is_success() {
            let message = reply
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Relay {
                status: status.as_u16(),
                message,
            });
        }

        let reply = reply.map_err(|e| {
            ClientError::MalformedResponse(format!("Failed to parse relay reply: {}", e))
        })?;

        if let Some(error) = reply.error {
            return Err(ClientError::Relay {
                status: status.as_u16(),
                message: error,
            });
        }

        reply
            .message
            .ok_or_else(|| ClientError::MalformedResponse("Reply has no message".to_string()))
    }
}
