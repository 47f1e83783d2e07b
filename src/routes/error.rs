//! Relay failures and their HTTP shape
//!
//! Every failure leaves as `{ "error": <user-facing text> }`. Upstream
//! detail is logged here and never returned to the caller.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::providers::UpstreamError;

/// "Sorry, we can't handle your request right now"
pub const GENERIC_FAILURE: &str = "對唔住，暫時未能處理你嘅請求";
/// "The request timed out, please try again later"
pub const TIMEOUT_FAILURE: &str = "請求超時，請稍後再試";
/// "Invalid request format"
pub const INVALID_REQUEST: &str = "請求格式無效";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {detail}")]
    BadRequest { status: StatusCode, detail: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { status, .. } => *status,
            Self::Upstream(UpstreamError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => INVALID_REQUEST,
            Self::Upstream(UpstreamError::Timeout) => TIMEOUT_FAILURE,
            Self::Upstream(_) => GENERIC_FAILURE,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::BadRequest { detail, .. } => {
                tracing::warn!(%status, detail = %detail, "rejected relay request")
            }
            Self::Upstream(UpstreamError::Timeout) => {
                tracing::error!(%status, "upstream completion timed out")
            }
            Self::Upstream(err) => tracing::error!(%status, error = %err, "upstream completion failed"),
        }

        (
            status,
            Json(ErrorBody {
                error: self.user_message(),
            }),
        )
            .into_response()
    }
}
