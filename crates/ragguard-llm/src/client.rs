//! Completion client trait and OpenAI-compatible HTTP implementation

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::CompletionConfig;
use crate::error::TransportError;
use crate::Result;

/// Sampling temperature used for every reasoning request.
pub const DETERMINISTIC_TEMPERATURE: f32 = 0.0;

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Request with temperature pinned to [`DETERMINISTIC_TEMPERATURE`].
    pub fn deterministic(model: &str, prompt: impl Into<String>) -> Self {
        CompletionRequest {
            prompt: prompt.into(),
            model: model.to_string(),
            temperature: DETERMINISTIC_TEMPERATURE,
        }
    }
}

/// Sends a prompt to a language model and returns its full text response.
///
/// Implementations return the completion with surrounding whitespace
/// stripped, and fail with [`TransportError`] rather than returning an
/// empty string.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

/// Subset of the `/chat/completions` response we read.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the trimmed text of the first choice out of a response.
pub(crate) fn extract_completion_text(response: &ChatCompletionResponse) -> Result<String> {
    let text = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .map(str::trim)
        .unwrap_or_default();

    if text.is_empty() {
        return Err(TransportError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Client for OpenAI-compatible chat completion endpoints (OpenAI, Ollama,
/// vLLM, ...).
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    config: CompletionConfig,
    http_client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a new client for the configured endpoint
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("ragguard-llm/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(OpenAiCompatClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(CompletionConfig::from_env())
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    fn map_send_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.config.timeout_secs)
        } else {
            TransportError::from(err)
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    #[instrument(skip(self, request), fields(model = %request.model, prompt_len = request.prompt.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatCompletionBody {
            model: &request.model,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .http_client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await.map_err(|e| self.map_send_error(e))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&raw)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        let text = extract_completion_text(&parsed)?;
        debug!(completion_len = text.len(), "completion received");
        Ok(text)
    }
}
