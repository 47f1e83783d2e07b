//! Built-in system instructions
//!
//! The relay injects exactly one of these ahead of every conversation it
//! forwards. Clients never send or see it.

pub mod builtin {
    /// Friendly assistant answering in Cantonese, written in Traditional Chinese
    pub const CANTONESE_ASSISTANT: &str = "你是一個友善的AI助手，請用粵語和繁體中文回答問題。";
}
