//! Application configuration
//!
//! Settings come from an optional TOML file named by `CHAT_RELAY_CONFIG`,
//! then environment variables override individual fields:
//!
//! | Variable             | Field                  | Default                        |
//! |----------------------|------------------------|--------------------------------|
//! | `HOST`               | `host`                 | `127.0.0.1`                    |
//! | `PORT`               | `port`                 | `3000`                         |
//! | `DEEPSEEK_API_KEY`   | `upstream.api_key`     | unset                          |
//! | `DEEPSEEK_BASE_URL`  | `upstream.base_url`    | `https://api.deepseek.com/v1`  |
//! | `DEEPSEEK_MODEL`     | `upstream.model`       | `deepseek-chat`                |
//! | `RELAY_TIMEOUT_SECS` | `upstream.timeout`     | `120`                          |
//!
//! # Example File
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//!
//! [upstream]
//! base_url = "https://api.deepseek.com/v1"
//! model = "deepseek-chat"
//! timeout_secs = 90
//! ```

pub mod client;
pub mod prompts;

use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

pub use client::ClientConfig;

pub const CONFIG_PATH_ENV: &str = "CHAT_RELAY_CONFIG";

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_MODEL: &str = "deepseek-chat";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upstream: UpstreamConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Config {
    /// Load the file named by `CHAT_RELAY_CONFIG` (if any), then apply
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string; absent fields keep their defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(host) = file.host {
            config.host = host;
        }
        if let Some(port) = file.port {
            config.port = port;
        }

        let upstream = &mut config.upstream;
        if let Some(base_url) = file.upstream.base_url {
            upstream.base_url = base_url;
        }
        if file.upstream.api_key.is_some() {
            upstream.api_key = file.upstream.api_key;
        }
        if let Some(model) = file.upstream.model {
            upstream.model = model;
        }
        if let Some(secs) = file.upstream.timeout_secs {
            upstream.timeout = timeout_from_secs(secs)?;
        }

        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::Validation(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(key) = lookup("DEEPSEEK_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.upstream.api_key = Some(key);
        }
        if let Some(base_url) = lookup("DEEPSEEK_BASE_URL") {
            self.upstream.base_url = base_url;
        }
        if let Some(model) = lookup("DEEPSEEK_MODEL") {
            self.upstream.model = model;
        }
        if let Some(secs) = lookup("RELAY_TIMEOUT_SECS") {
            let secs = secs.parse().map_err(|_| {
                ConfigError::Validation(format!("RELAY_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            self.upstream.timeout = timeout_from_secs(secs)?;
        }
        Ok(())
    }
}

fn timeout_from_secs(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation(
            "upstream timeout must be at least one second".into(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Settings for the upstream completion API, injected into the relay
/// when it is built.
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Base URL for the API, without the `/chat/completions` suffix
    pub base_url: String,
    /// Bearer credential; never sent to relay callers
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Upper bound on a single upstream call
    pub timeout: Duration,
    /// Instruction injected ahead of every forwarded conversation
    pub system_prompt: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            system_prompt: prompts::builtin::CANTONESE_ASSISTANT.to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Default settings pointed at `base_url`, e.g. a local stub server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    upstream: FileUpstreamConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileUpstreamConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
