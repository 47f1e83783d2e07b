//! Chat Relay - minimal AI chat relay
//!
//! A browser (or the bundled terminal front-end) keeps the conversation and
//! posts it to `POST /api/chat`. The relay prepends a fixed system
//! instruction, makes one call to an OpenAI-compatible completion API, and
//! returns `{ "message": ... }` or `{ "error": ... }`.

pub mod client;
pub mod config;
pub mod conversation;
pub mod core;
pub mod providers;
pub mod routes;

use std::sync::Arc;

use axum::{http::Method, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::UpstreamConfig;
use crate::core::ChatRelay;
use crate::providers::UpstreamError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ChatRelay>,
}

impl AppState {
    pub fn new(upstream: UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            relay: Arc::new(ChatRelay::new(upstream)?),
        })
    }
}

/// Full application: routes plus CORS and request tracing
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
