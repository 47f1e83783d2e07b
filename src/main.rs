//! Chat Relay server
//!
//! Serves `POST /api/chat` and `GET /health`.

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_relay::config::Config;
use chat_relay::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    if config.upstream.api_key.is_some() {
        tracing::info!("Upstream credential configured");
    } else {
        tracing::warn!("DEEPSEEK_API_KEY is not set, upstream calls will be unauthenticated");
    }
    tracing::info!(
        base_url = %config.upstream.base_url,
        model = %config.upstream.model,
        timeout_secs = config.upstream.timeout.as_secs(),
        "Upstream completion API"
    );

    let app = build_app(AppState::new(config.upstream)?);

    tracing::info!("Chat relay running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
