//! API routes

mod error;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, Role};
use crate::AppState;

pub use error::{ApiError, GENERIC_FAILURE, INVALID_REQUEST, TIMEOUT_FAILURE};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct RelayRequest {
    pub messages: Vec<Message>,
}

impl RelayRequest {
    /// The system instruction is owned by the relay; clients may not supply one.
    fn validate(&self) -> Result<(), ApiError> {
        match self.messages.iter().position(|m| m.role == Role::System) {
            Some(index) => Err(ApiError::BadRequest {
                status: StatusCode::BAD_REQUEST,
                detail: format!("messages[{index}] has role \"system\""),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub message: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let message = state.relay.relay(&request.messages).await?;

    Ok(Json(RelayResponse { message }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
}
