//! The four reasoning stages.
//!
//! # Module layout
//!
//! - [`note_taker`]: `NoteTaker`: documents → one note per document
//! - [`synthesizer`]: `GroundedSynthesizer`: notes → canonical answer or abstention
//! - [`intrinsic`]: `IntrinsicReasoner`: query alone → answer with certainty
//! - [`arbiter`]: `merge` policy and the optional model review
//!
//! Every stage that talks to the model does so through one deterministic
//! [`ragguard_llm::CompletionRequest`].

pub mod arbiter;
pub mod intrinsic;
pub mod note_taker;
pub mod synthesizer;

use std::sync::Arc;

use ragguard_llm::{CompletionClient, CompletionRequest};

use crate::error::PipelineResult;

/// Completion client plus model id, shared by the stages of one pipeline.
#[derive(Clone)]
pub struct StageClient {
    client: Arc<dyn CompletionClient>,
    model: String,
}

impl StageClient {
    pub fn new(client: Arc<dyn CompletionClient>, model: &str) -> Self {
        StageClient {
            client,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) async fn ask(&self, prompt: String) -> PipelineResult<String> {
        let request = CompletionRequest::deterministic(&self.model, prompt);
        Ok(self.client.complete(&request).await?)
    }
}

impl std::fmt::Debug for StageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageClient")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
