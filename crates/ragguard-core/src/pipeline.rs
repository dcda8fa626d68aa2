//! Pipeline orchestration.
//!
//! One run is a fork and a join:
//!
//! ```text
//!   ┌─ notes ─► synthesis ─┐
//! ──┤                      ├─► arbiter ─► FinalResult
//!   └─ intrinsic ──────────┘
//! ```
//!
//! The two branches run as separate tokio tasks with no shared mutable
//! state. If either fails, the other is aborted and the run returns the
//! error; nothing partial is ever returned.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use ragguard_llm::CompletionClient;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::cancel::CancelSignal;
use crate::domain::{DocumentSet, FinalResult, GroundedAnswer, IntrinsicAnswer, NoteSet, Query};
use crate::error::{stage, PipelineError, PipelineResult};
use crate::obs::{
    emit_run_failed, emit_run_finished, emit_run_started, emit_stage_finished, emit_stage_started,
    run_span,
};
use crate::reasoning::arbiter::{Arbiter, ArbiterReview, Arbitration, ArbitrationMode};
use crate::reasoning::intrinsic::IntrinsicReasoner;
use crate::reasoning::note_taker::NoteTaker;
use crate::reasoning::synthesizer::GroundedSynthesizer;
use crate::reasoning::StageClient;

/// Core configuration for a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Model identifier sent with every request
    pub model: String,
    pub arbitration: ArbitrationMode,
}

impl PipelineConfig {
    pub fn new(model: &str) -> Self {
        PipelineConfig {
            model: model.to_string(),
            arbitration: ArbitrationMode::default(),
        }
    }

    pub fn with_arbitration(mut self, arbitration: ArbitrationMode) -> Self {
        self.arbitration = arbitration;
        self
    }
}

/// Every artifact a run produced, for callers that want more than the
/// final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub query: Query,
    pub document_digest: String,
    pub notes: NoteSet,
    pub grounded: GroundedAnswer,
    pub intrinsic: IntrinsicAnswer,
    pub review: Option<ArbiterReview>,
    pub result: FinalResult,
}

/// The four-stage reasoning pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    note_taker: NoteTaker,
    synthesizer: GroundedSynthesizer,
    intrinsic: IntrinsicReasoner,
    arbiter: Arbiter,
}

impl Pipeline {
    pub fn new(client: Arc<dyn CompletionClient>, config: PipelineConfig) -> Self {
        let stage_client = StageClient::new(client, &config.model);
        Pipeline {
            note_taker: NoteTaker::new(stage_client.clone()),
            synthesizer: GroundedSynthesizer::new(stage_client.clone()),
            intrinsic: IntrinsicReasoner::new(stage_client.clone()),
            arbiter: Arbiter::new(stage_client, config.arbitration),
        }
    }

    /// Answer `query` from `docs` and the model's own knowledge.
    pub async fn run(&self, query: &Query, docs: &DocumentSet) -> PipelineResult<FinalResult> {
        Ok(self.run_with_report(query, docs).await?.result)
    }

    /// Like [`Pipeline::run`], returning every intermediate artifact.
    pub async fn run_with_report(
        &self,
        query: &Query,
        docs: &DocumentSet,
    ) -> PipelineResult<RunReport> {
        self.run_cancellable(query, docs, CancelSignal::never()).await
    }

    /// Like [`Pipeline::run_with_report`], but gives up with
    /// [`PipelineError::Cancelled`] if `cancel` fires before arbitration.
    /// In-flight branch tasks are aborted and their results discarded.
    pub async fn run_cancellable(
        &self,
        query: &Query,
        docs: &DocumentSet,
        cancel: CancelSignal,
    ) -> PipelineResult<RunReport> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let document_digest = docs.digest();
        let span = run_span(&run_id, &document_digest);

        async move {
            let started_at = Utc::now();
            let clock = Instant::now();
            emit_run_started(&run_id, docs.len());

            match self.execute(query, docs, &cancel).await {
                Ok(artifacts) => {
                    let Arbitration { result, review } = artifacts.arbitration;
                    emit_run_finished(&run_id, elapsed_ms(clock), result.provenance);
                    Ok(RunReport {
                        run_id,
                        started_at,
                        finished_at: Utc::now(),
                        query: query.clone(),
                        document_digest,
                        notes: artifacts.notes,
                        grounded: artifacts.grounded,
                        intrinsic: artifacts.intrinsic,
                        review,
                        result,
                    })
                }
                Err(err) => {
                    emit_run_failed(&run_id, &err);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        query: &Query,
        docs: &DocumentSet,
        cancel: &CancelSignal,
    ) -> PipelineResult<RunArtifacts> {
        let mut grounded_task = BranchTask::spawn(grounded_chain(
            self.note_taker.clone(),
            self.synthesizer.clone(),
            query.clone(),
            docs.clone(),
        ));
        let mut intrinsic_task =
            BranchTask::spawn(intrinsic_branch(self.intrinsic.clone(), query.clone()));

        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
            joined = async {
                tokio::try_join!(grounded_task.join(), intrinsic_task.join())
            } => joined,
        };
        let ((notes, grounded), intrinsic) = joined?;

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        emit_stage_started(stage::ARBITER);
        let clock = Instant::now();
        let arbitration = self.arbiter.arbitrate(query, &grounded, &intrinsic).await?;
        emit_stage_finished(
            stage::ARBITER,
            elapsed_ms(clock),
            &arbitration.result.provenance.to_string(),
        );

        Ok(RunArtifacts {
            notes,
            grounded,
            intrinsic,
            arbitration,
        })
    }
}

struct RunArtifacts {
    notes: NoteSet,
    grounded: GroundedAnswer,
    intrinsic: IntrinsicAnswer,
    arbitration: Arbitration,
}

/// Notes, then synthesis from those notes.
async fn grounded_chain(
    note_taker: NoteTaker,
    synthesizer: GroundedSynthesizer,
    query: Query,
    docs: DocumentSet,
) -> PipelineResult<(NoteSet, GroundedAnswer)> {
    emit_stage_started(stage::NOTES);
    let clock = Instant::now();
    let notes = note_taker.take_notes(&query, &docs).await?;
    emit_stage_finished(
        stage::NOTES,
        elapsed_ms(clock),
        &format!("{} notes", notes.len()),
    );

    emit_stage_started(stage::SYNTHESIS);
    let clock = Instant::now();
    let grounded = synthesizer.synthesize(&query, &notes).await?;
    let outcome = if grounded.is_abstention() {
        "abstained"
    } else {
        "canonical"
    };
    emit_stage_finished(stage::SYNTHESIS, elapsed_ms(clock), outcome);

    Ok((notes, grounded))
}

async fn intrinsic_branch(
    reasoner: IntrinsicReasoner,
    query: Query,
) -> PipelineResult<IntrinsicAnswer> {
    emit_stage_started(stage::INTRINSIC);
    let clock = Instant::now();
    let answer = reasoner.reason(&query).await?;
    emit_stage_finished(
        stage::INTRINSIC,
        elapsed_ms(clock),
        &answer.certainty.to_string(),
    );
    Ok(answer)
}

/// A spawned branch that is aborted when dropped, so an abandoned run
/// never leaves requests in flight.
struct BranchTask<T> {
    handle: JoinHandle<PipelineResult<T>>,
}

impl<T: Send + 'static> BranchTask<T> {
    fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = PipelineResult<T>> + Send + 'static,
    {
        BranchTask {
            handle: tokio::spawn(future.in_current_span()),
        }
    }

    async fn join(&mut self) -> PipelineResult<T> {
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(err) => Err(PipelineError::BranchFailed(err.to_string())),
        }
    }
}

impl<T> Drop for BranchTask<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn elapsed_ms(clock: Instant) -> u64 {
    clock.elapsed().as_millis() as u64
}
