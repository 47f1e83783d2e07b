//! Conversation types and session state
//!
//! A [`ConversationStore`] owns the ordered turn history of one chat session
//! and mediates at most one in-flight relay call at a time:
//!
//! ```text
//! Idle --submit--> Awaiting --reply / failure--> Idle
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ClientError, RelayClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Append-only turn history. Only user and assistant turns can be added;
/// the system instruction belongs to the relay.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: &str) -> &Message {
        self.push(Message::user(content))
    }

    pub fn push_assistant(&mut self, content: &str) -> &Message {
        self.push(Message::assistant(content))
    }

    fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    Awaiting,
}

/// Why a `submit` call was a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input was empty or whitespace only
    Empty,
    /// A relay call is already in flight
    Busy,
}

/// Result of [`ConversationStore::submit`]
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing was appended and no relay call was made
    Ignored(IgnoreReason),
    /// The assistant reply that was appended to the conversation
    Replied(Message),
    /// The relay call failed; the transcript holds the user turn only
    Failed(ClientError),
}

struct Session {
    conversation: Conversation,
    state: ConversationState,
}

/// Client-side holder of one session's conversation
pub struct ConversationStore<R> {
    id: Uuid,
    relay: R,
    session: Mutex<Session>,
}

impl<R: RelayClient> ConversationStore<R> {
    pub fn new(relay: R) -> Self {
        Self {
            id: Uuid::new_v4(),
            relay,
            session: Mutex::new(Session {
                conversation: Conversation::new(),
                state: ConversationState::Idle,
            }),
        }
    }

    /// Session identifier, used to correlate log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Snapshot of the transcript in turn order
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.session).conversation.messages().to_vec()
    }

    pub fn len(&self) -> usize {
        lock(&self.session).conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> ConversationState {
        lock(&self.session).state
    }

    pub fn is_awaiting(&self) -> bool {
        self.state() == ConversationState::Awaiting
    }

    /// Append a user turn and relay the full history.
    ///
    /// Empty input, or input arriving while a call is in flight, is ignored
    /// without touching the transcript. On failure nothing is appended for
    /// the assistant; the error is logged and handed back to the caller.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored(IgnoreReason::Empty);
        }

        let history = {
            let mut session = lock(&self.session);
            if session.state == ConversationState::Awaiting {
                tracing::debug!(conversation_id = %self.id, "submit ignored, reply pending");
                return SubmitOutcome::Ignored(IgnoreReason::Busy);
            }
            session.conversation.push_user(text);
            session.state = ConversationState::Awaiting;
            session.conversation.messages().to_vec()
        };

        let in_flight = InFlight {
            session: &self.session,
        };

        tracing::debug!(conversation_id = %self.id, turns = history.len(), "relaying conversation");
        let outcome = match self.relay.send(&history).await {
            Ok(reply) => {
                let message = lock(&self.session)
                    .conversation
                    .push_assistant(&reply)
                    .clone();
                SubmitOutcome::Replied(message)
            }
            Err(err) => {
                tracing::warn!(
                    conversation_id = %self.id,
                    error = %err,
                    "relay call failed, no assistant turn appended"
                );
                SubmitOutcome::Failed(err)
            }
        };

        drop(in_flight);
        outcome
    }
}

/// Returns the session to `Idle` when the relay call settles or the
/// submit future is dropped.
struct InFlight<'a> {
    session: &'a Mutex<Session>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.session).state = ConversationState::Idle;
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
