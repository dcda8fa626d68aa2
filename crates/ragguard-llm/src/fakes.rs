//! In-memory fakes for the completion client (testing only)
//!
//! Provides `ScriptedCompletionClient`, which satisfies the
//! [`CompletionClient`] contract without any network access.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::client::{CompletionClient, CompletionRequest};
use crate::error::TransportError;
use crate::Result;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(TransportError),
    Hang,
}

#[derive(Debug, Clone)]
struct Rule {
    marker: String,
    reply: Reply,
}

/// Scripted completion client.
///
/// Each prompt is routed to the first rule whose marker is a substring of
/// the prompt. Text replies are trimmed like a real endpoint's; blank text
/// becomes [`TransportError::EmptyResponse`]. Hanging rules never resolve,
/// which lets tests exercise cancellation. Prompts that match nothing
/// fail with [`TransportError::Http`].
#[derive(Debug, Default)]
pub struct ScriptedCompletionClient {
    rules: Vec<Rule>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `response` to prompts containing `marker`.
    pub fn on(mut self, marker: &str, response: &str) -> Self {
        self.rules.push(Rule {
            marker: marker.to_string(),
            reply: Reply::Text(response.to_string()),
        });
        self
    }

    /// Fail with `error` for prompts containing `marker`.
    pub fn fail_on(mut self, marker: &str, error: TransportError) -> Self {
        self.rules.push(Rule {
            marker: marker.to_string(),
            reply: Reply::Fail(error),
        });
        self
    }

    /// Never answer prompts containing `marker`.
    pub fn hang_on(mut self, marker: &str) -> Self {
        self.rules.push(Rule {
            marker: marker.to_string(),
            reply: Reply::Hang,
        });
        self
    }

    /// The request log; a panic in another test thread does not lock it out.
    fn recorded(&self) -> MutexGuard<'_, Vec<CompletionRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.recorded().clone()
    }

    /// Number of requests whose prompt contains `marker`.
    pub fn count_matching(&self, marker: &str) -> usize {
        self.recorded()
            .iter()
            .filter(|r| r.prompt.contains(marker))
            .count()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.recorded().push(request.clone());

        let rule = self
            .rules
            .iter()
            .find(|rule| request.prompt.contains(&rule.marker))
            .ok_or_else(|| TransportError::Http("no scripted reply".to_string()))?;

        match &rule.reply {
            Reply::Text(text) if text.trim().is_empty() => Err(TransportError::EmptyResponse),
            Reply::Text(text) => Ok(text.trim().to_string()),
            Reply::Fail(err) => Err(err.clone()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let client = ScriptedCompletionClient::new()
            .on("notes", "  first  ")
            .on("notes", "second");

        let reply = client
            .complete(&CompletionRequest::deterministic("m", "reading notes please"))
            .await
            .unwrap();

        assert_eq!(reply, "first");
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_prompt_is_transport_error() {
        let client = ScriptedCompletionClient::new().on("notes", "x");
        let err = client
            .complete(&CompletionRequest::deterministic("m", "something else"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }

    #[tokio::test]
    async fn test_fail_rule_and_blank_reply() {
        let client = ScriptedCompletionClient::new()
            .fail_on("down", TransportError::Timeout(5))
            .on("blank", "   ");

        let err = client
            .complete(&CompletionRequest::deterministic("m", "endpoint down"))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::Timeout(5));

        let err = client
            .complete(&CompletionRequest::deterministic("m", "blank reply"))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::EmptyResponse);
        assert_eq!(client.count_matching("blank"), 1);
    }

    #[tokio::test]
    async fn test_request_log_survives_a_panicking_holder() {
        let client = std::sync::Arc::new(ScriptedCompletionClient::new().on("notes", "ok"));

        let holder = client.clone();
        let panicked = std::thread::spawn(move || {
            let _guard = holder.requests.lock().unwrap();
            panic!("test thread dies while holding the log");
        })
        .join();
        assert!(panicked.is_err());

        client
            .complete(&CompletionRequest::deterministic("m", "notes"))
            .await
            .unwrap();
        assert_eq!(client.requests().len(), 1);
        assert_eq!(client.count_matching("notes"), 1);
    }
}
