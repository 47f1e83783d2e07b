//! Terminal chat front-end
//!
//! Keeps one conversation in memory and relays it through a running
//! chat relay. Type a message and press Enter; `/quit` or EOF exits.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_relay::client::{ClientError, HttpRelayClient};
use chat_relay::config::ClientConfig;
use chat_relay::conversation::{ConversationStore, SubmitOutcome};
use chat_relay::routes::GENERIC_FAILURE;

const PROMPT: &str = "我> ";
const THINKING: &str = "正在思考...";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env();
    let store = ConversationStore::new(HttpRelayClient::from_config(&config));
    tracing::debug!(conversation_id = %store.id(), relay = %config.relay_url, "chat session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_flush(PROMPT)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        if !line.trim().is_empty() {
            println!("AI> {THINKING}");
        }

        match store.submit(&line).await {
            SubmitOutcome::Replied(message) => println!("AI> {}\n", message.content),
            SubmitOutcome::Failed(err) => eprintln!("!! {}\n", failure_text(&err)),
            SubmitOutcome::Ignored(_) => {}
        }
    }

    println!();
    Ok(())
}

/// The relay's own user-facing text when it sent one, a generic apology otherwise
fn failure_text(err: &ClientError) -> &str {
    match err {
        ClientError::Relay { message, .. } => message.as_str(),
        _ => GENERIC_FAILURE,
    }
}

fn print_flush(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}
