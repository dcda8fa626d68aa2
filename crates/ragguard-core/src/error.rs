//! Error taxonomy for the reasoning pipeline.

use ragguard_llm::TransportError;

/// Pipeline stage names, used in contract violations and log events.
pub mod stage {
    pub const NOTES: &str = "notes";
    pub const SYNTHESIS: &str = "synthesis";
    pub const INTRINSIC: &str = "intrinsic";
    pub const ARBITER: &str = "arbiter";
}

/// Errors produced by the reasoning pipeline.
///
/// No variant carries a partial result: a run either yields a
/// `FinalResult` or one of these.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("query must not be empty")]
    EmptyQuery,

    /// The completion endpoint could not produce a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The model answered, but not in the structure the stage expects.
    #[error("contract violation in {stage} stage: {detail}")]
    ContractViolation { stage: &'static str, detail: String },

    #[error("pipeline run cancelled")]
    Cancelled,

    #[error("pipeline branch failed: {0}")]
    BranchFailed(String),
}

impl PipelineError {
    pub(crate) fn contract(stage: &'static str, detail: impl Into<String>) -> Self {
        PipelineError::ContractViolation {
            stage,
            detail: detail.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, PipelineError::Transport(_))
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, PipelineError::ContractViolation { .. })
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
