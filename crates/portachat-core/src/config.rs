//! Application configuration model.
//!
//! The on-disk representation lives in `config.toml`; loading and caching are
//! handled by the infrastructure layer.

use serde::{Deserialize, Serialize};

/// Default chat model used when neither the config file nor the environment
/// name one.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI chat completions endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default tracing filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable that overrides the configured model.
pub const MODEL_ENV_VAR: &str = "OPENAI_MODEL_NAME";

/// Root configuration for Portachat.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PortachatConfig {
    /// Model name sent with every completion request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Full URL of the chat completions endpoint.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// HTTP timeout for completion requests. `None` waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// Filter directive for the log file (e.g. `info`, `portachat_core=debug`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for PortachatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base_url: default_api_base_url(),
            max_tokens: None,
            request_timeout_secs: None,
            log_level: default_log_level(),
        }
    }
}

impl PortachatConfig {
    /// Applies environment overrides on top of the file values.
    pub fn with_env_overrides(self) -> Self {
        self.with_model_override(std::env::var(MODEL_ENV_VAR).ok())
    }

    /// Replaces the model when `model` is a non-blank name.
    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
        self
    }
}
