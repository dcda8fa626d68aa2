//! Error types for ragguard-llm

use thiserror::Error;

/// Errors that can occur while talking to the completion endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Endpoint unreachable or the request could not be sent
    #[error("HTTP error: {0}")]
    Http(String),

    /// Endpoint answered with a non-success status
    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request exceeded the configured timeout
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Response body did not have the expected shape
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    /// Response carried no completion text
    #[error("completion endpoint returned an empty response")]
    EmptyResponse,

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::MalformedResponse(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}
