//! RAGGuard Core: Dual-Path Reasoning with Poisoned-Retrieval Arbitration
//!
//! Answers a question two independent ways and arbitrates:
//!
//! - **grounded**: strict reading notes over the retrieved documents, then
//!   synthesis that abstains unless a note carries a canonical direct answer;
//! - **intrinsic**: the model's own knowledge, ignoring retrieval, with a
//!   self-reported certainty;
//! - **arbiter**: a deterministic policy that picks the final answer and
//!   tags its provenance (`RAG`, `Intrinsic` or `Abstain`).
//!
//! ## Layer 1 - Reasoning
//!
//! Focus: Never surfacing speculative retrieved content as a canonical answer.

pub mod cancel;
pub mod domain;
pub mod error;
pub mod obs;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod reasoning;
pub mod scenarios;
pub mod telemetry;

pub use cancel::{CancelSignal, Cancellation};
pub use domain::{
    Certainty, Document, DocumentSet, FinalResult, Framing, GroundedAnswer, IntrinsicAnswer,
    NoteEntry, NoteSet, Provenance, Query, FINAL_ABSTENTION, GROUNDED_ABSTENTION,
};
pub use error::{PipelineError, PipelineResult};
pub use obs::{
    emit_gate_overrode, emit_review_disagreed, emit_run_failed, emit_run_finished,
    emit_run_started, emit_stage_finished, emit_stage_started,
};
pub use pipeline::{Pipeline, PipelineConfig, RunReport};
pub use reasoning::arbiter::{merge, Arbiter, ArbiterReview, Arbitration, ArbitrationMode};
pub use reasoning::intrinsic::IntrinsicReasoner;
pub use reasoning::note_taker::NoteTaker;
pub use reasoning::synthesizer::{enforce_decision_rule, GroundedSynthesizer};
pub use reasoning::StageClient;
pub use scenarios::Scenario;
pub use telemetry::init_tracing;
