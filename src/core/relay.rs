//! Conversation relay
//!
//! The ChatRelay:
//! 1. Receives the client's conversation (user and assistant turns only)
//! 2. Prepends the configured system instruction
//! 3. Makes a single upstream completion call
//! 4. Returns the first completion's content

use crate::config::UpstreamConfig;
use crate::conversation::Message;
use crate::providers::{OpenAICompatProvider, UpstreamError};

pub struct ChatRelay {
    provider: OpenAICompatProvider,
}

impl ChatRelay {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            provider: OpenAICompatProvider::new(config)?,
        })
    }

    pub fn system_prompt(&self) -> &str {
        &self.provider.config().system_prompt
    }

    /// The exact message sequence sent upstream: one system message, then
    /// `history` unmodified and in order.
    pub fn upstream_messages(&self, history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(self.system_prompt()));
        messages.extend_from_slice(history);
        messages
    }

    pub async fn relay(&self, history: &[Message]) -> Result<String, UpstreamError> {
        let messages = self.upstream_messages(history);

        tracing::debug!(
            turns = history.len(),
            model = %self.provider.config().model,
            "forwarding conversation upstream"
        );

        let reply = self.provider.complete(&messages).await?;

        tracing::debug!(reply_chars = reply.chars().count(), "upstream completion received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::prompts::builtin;
    use crate::conversation::Role;

    #[test]
    fn test_system_message_is_first_and_only() {
        let relay = ChatRelay::new(UpstreamConfig::default()).unwrap();
        let history = vec![
            Message::user("你好"),
            Message::assistant("你好！有咩可以幫到你？"),
            Message::user("今日天氣點？"),
        ];

        let messages = relay.upstream_messages(&history);

        assert_eq!(messages.len(), history.len() + 1);
        assert_eq!(messages[0], Message::system(builtin::CANTONESE_ASSISTANT));
        assert_eq!(&messages[1..], history.as_slice());
        assert_eq!(
            messages.iter().filter(|m| m.role == Role::System).count(),
            1
        );
    }

    #[test]
    fn test_empty_history_sends_system_only() {
        let mut config = UpstreamConfig::default();
        config.system_prompt = "answer in English".into();
        let relay = ChatRelay::new(config).unwrap();

        assert_eq!(
            relay.upstream_messages(&[]),
            vec![Message::system("answer in English")]
        );
    }
}
