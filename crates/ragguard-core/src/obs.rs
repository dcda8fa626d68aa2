//! Structured observability hooks for pipeline runs.
//!
//! This module provides:
//! - The run-scoped tracing span
//! - Emission functions for stage boundaries and arbitration outcomes
//!
//! Events are emitted at `info!` level, deviations at `warn!`.
//! Output format is chosen by [`crate::telemetry::init_tracing`].

use tracing::{info, warn};

use crate::domain::Provenance;

/// Span for one run, tagged with the run id and a short document digest.
///
/// Async code attaches it with `tracing::Instrument`.
pub fn run_span(run_id: &str, document_digest: &str) -> tracing::Span {
    let short_digest = document_digest.get(..12).unwrap_or(document_digest);
    tracing::info_span!("ragguard.run", run_id = %run_id, documents = %short_digest)
}

/// Emit event: run started.
pub fn emit_run_started(run_id: &str, document_count: usize) {
    info!(event = "run.started", run_id = %run_id, document_count = document_count);
}

/// Emit event: a stage is about to call the completion endpoint.
pub fn emit_stage_started(stage: &str) {
    info!(event = "stage.started", stage = %stage);
}

/// Emit event: a stage produced its artifact.
///
/// `outcome` is a short summary (note count, abstention, certainty, ...).
pub fn emit_stage_finished(stage: &str, duration_ms: u64, outcome: &str) {
    info!(
        event = "stage.finished",
        stage = %stage,
        duration_ms = duration_ms,
        outcome = %outcome,
    );
}

/// Emit event: run finished with the arbiter's provenance.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, provenance: Provenance) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        provenance = %provenance,
    );
}

/// Emit event: run aborted (warning level).
pub fn emit_run_failed(run_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "run.failed", run_id = %run_id, error = %error);
}

/// Emit event: the notes overruled the synthesis reply.
pub fn emit_gate_overrode(model_said: &str, enforced: &str) {
    warn!(
        event = "synthesis.gate_overrode",
        model_said = %model_said,
        enforced = %enforced,
    );
}

/// Emit event: the model's arbitration verdict differs from the policy.
pub fn emit_review_disagreed(policy: Provenance, model: Provenance) {
    warn!(event = "arbiter.review_disagreed", policy = %policy, model = %model);
}
