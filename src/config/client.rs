//! Settings for the terminal chat front-end

use std::env;

pub const RELAY_URL_ENV: &str = "CHAT_RELAY_URL";

const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000";

/// Where the conversation store sends its history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub relay_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(RELAY_URL_ENV).filter(|url| !url.trim().is_empty()) {
            Some(relay_url) => Self { relay_url },
            None => Self::default(),
        }
    }
}
