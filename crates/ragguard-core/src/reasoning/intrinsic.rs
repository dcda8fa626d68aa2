//! Knowledge-only reasoning that never sees retrieved material.

use tracing::instrument;

use crate::domain::{IntrinsicAnswer, Query};
use crate::error::PipelineResult;
use crate::parse::parse_intrinsic;
use crate::prompts::build_intrinsic_prompt;
use crate::reasoning::StageClient;

/// Answers from the model's internal knowledge, with a self-reported
/// certainty that downstream logic consumes but does not audit.
#[derive(Debug, Clone)]
pub struct IntrinsicReasoner {
    client: StageClient,
}

impl IntrinsicReasoner {
    pub fn new(client: StageClient) -> Self {
        IntrinsicReasoner { client }
    }

    /// Takes only the query: there is no way to hand it documents.
    #[instrument(skip_all)]
    pub async fn reason(&self, query: &Query) -> PipelineResult<IntrinsicAnswer> {
        let reply = self.client.ask(build_intrinsic_prompt(query)).await?;
        parse_intrinsic(&reply)
    }
}
