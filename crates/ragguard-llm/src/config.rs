//! Completion endpoint configuration
//!
//! Configuration is an explicit value handed to the client constructor, so
//! two pipelines pointed at different endpoints never interfere.

use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
pub(crate) const DEFAULT_API_KEY: &str = "ollama";
pub(crate) const DEFAULT_MODEL: &str = "glm-5:cloud";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Completion endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,
    /// Bearer credential sent with every request
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Transport-level request timeout
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        CompletionConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CompletionConfig {
    /// Create config for a specific endpoint
    pub fn new(base_url: &str) -> Self {
        CompletionConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Create a new config from environment variables
    ///
    /// Reads `RAGGUARD_BASE_URL`, `RAGGUARD_API_KEY`, `RAGGUARD_MODEL` and
    /// `RAGGUARD_TIMEOUT_SECS`; anything unset or unparsable keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        CompletionConfig {
            base_url: lookup("RAGGUARD_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            api_key: lookup("RAGGUARD_API_KEY").unwrap_or(defaults.api_key),
            model: lookup("RAGGUARD_MODEL").unwrap_or(defaults.model),
            timeout_secs: lookup("RAGGUARD_TIMEOUT_SECS")
                .and_then(|secs| secs.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set the bearer credential
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Full URL of the chat completions route
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Copy of this config safe to print or log
    pub fn redacted(&self) -> Self {
        Self {
            api_key: "***".to_string(),
            ..self.clone()
        }
    }
}
