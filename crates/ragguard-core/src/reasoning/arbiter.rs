//! Final arbitration between the grounded and intrinsic answers.
//!
//! [`merge`] is the policy, evaluated in strict priority order:
//!
//! 1. a canonical grounded answer wins (`RAG`), whatever the intrinsic certainty;
//! 2. otherwise a `High`-certainty intrinsic answer wins (`Intrinsic`);
//! 3. otherwise the run abstains with [`FINAL_ABSTENTION`].
//!
//! A document set holding only speculative claims abstains at the grounded
//! stage, so it can only reach rule 2 or 3.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{
    Certainty, FinalResult, GroundedAnswer, IntrinsicAnswer, Provenance, Query, FINAL_ABSTENTION,
};
use crate::error::PipelineResult;
use crate::obs::emit_review_disagreed;
use crate::parse::parse_review;
use crate::prompts::build_review_prompt;
use crate::reasoning::StageClient;

/// Deterministic merge policy.
pub fn merge(query: &Query, grounded: &GroundedAnswer, intrinsic: &IntrinsicAnswer) -> FinalResult {
    let result = match grounded {
        GroundedAnswer::Canonical(text) => FinalResult {
            answer: text.clone(),
            provenance: Provenance::Rag,
        },
        GroundedAnswer::Abstained if intrinsic.certainty == Certainty::High => FinalResult {
            answer: intrinsic.answer.clone(),
            provenance: Provenance::Intrinsic,
        },
        GroundedAnswer::Abstained => FinalResult {
            answer: FINAL_ABSTENTION.to_string(),
            provenance: Provenance::Abstain,
        },
    };
    debug!(query = %query, provenance = %result.provenance, "merge policy applied");
    result
}

/// How the arbiter reaches its decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationMode {
    /// Apply [`merge`] only.
    #[default]
    Policy,
    /// Apply [`merge`] and also ask the model to arbitrate, recording
    /// whether it agrees. The policy decision is always the one returned.
    ModelReviewed,
}

/// The model's own arbitration verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbiterReview {
    pub answer: String,
    pub provenance: Provenance,
    /// Whether the model picked the same source as the policy.
    pub agrees: bool,
}

/// Arbiter decision plus the optional review that accompanied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arbitration {
    pub result: FinalResult,
    pub review: Option<ArbiterReview>,
}

/// Runs the merge policy and, in `ModelReviewed` mode, the model review.
#[derive(Debug, Clone)]
pub struct Arbiter {
    client: StageClient,
    mode: ArbitrationMode,
}

impl Arbiter {
    pub fn new(client: StageClient, mode: ArbitrationMode) -> Self {
        Arbiter { client, mode }
    }

    pub fn mode(&self) -> ArbitrationMode {
        self.mode
    }

    #[instrument(skip_all, fields(mode = ?self.mode))]
    pub async fn arbitrate(
        &self,
        query: &Query,
        grounded: &GroundedAnswer,
        intrinsic: &IntrinsicAnswer,
    ) -> PipelineResult<Arbitration> {
        let result = merge(query, grounded, intrinsic);

        let review = match self.mode {
            ArbitrationMode::Policy => None,
            ArbitrationMode::ModelReviewed => {
                let reply = self
                    .client
                    .ask(build_review_prompt(query, grounded, intrinsic))
                    .await?;
                let (answer, provenance) = parse_review(&reply)?;
                let agrees = provenance == result.provenance;
                if !agrees {
                    emit_review_disagreed(result.provenance, provenance);
                }
                Some(ArbiterReview {
                    answer,
                    provenance,
                    agrees,
                })
            }
        };

        Ok(Arbitration { result, review })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GROUNDED_ABSTENTION;
    use crate::prompts::REVIEW_INSTRUCTION;
    use ragguard_llm::fakes::ScriptedCompletionClient;
    use std::sync::Arc;

    fn query() -> Query {
        Query::new("Who does Fez marry in That '70s Show?").unwrap()
    }

    fn intrinsic(certainty: Certainty) -> IntrinsicAnswer {
        IntrinsicAnswer {
            answer: "Laurie Forman".to_string(),
            justification: "Season 6 green card marriage.".to_string(),
            certainty,
        }
    }

    #[test]
    fn test_canonical_grounded_wins_regardless_of_certainty() {
        let grounded = GroundedAnswer::Canonical("Laurie Forman (Eric's sister)".into());
        for certainty in [Certainty::High, Certainty::Medium, Certainty::Low] {
            let result = merge(&query(), &grounded, &intrinsic(certainty));
            assert_eq!(result.provenance, Provenance::Rag);
            assert_eq!(result.answer, "Laurie Forman (Eric's sister)");
        }
    }

    #[test]
    fn test_abstained_grounded_falls_back_to_certain_intrinsic() {
        let result = merge(&query(), &GroundedAnswer::Abstained, &intrinsic(Certainty::High));
        assert_eq!(result.provenance, Provenance::Intrinsic);
        assert_eq!(result.answer, "Laurie Forman");
    }

    #[test]
    fn test_abstained_grounded_and_uncertain_intrinsic_abstain() {
        for certainty in [Certainty::Medium, Certainty::Low] {
            let result = merge(&query(), &GroundedAnswer::Abstained, &intrinsic(certainty));
            assert_eq!(result, FinalResult::abstain());
            assert_eq!(result.answer, "Insufficient reliable information.");
            assert_ne!(result.answer, GROUNDED_ABSTENTION);
        }
    }

    #[tokio::test]
    async fn test_policy_mode_makes_no_request() {
        let fake = Arc::new(ScriptedCompletionClient::new());
        let arbiter = Arbiter::new(StageClient::new(fake.clone(), "m"), ArbitrationMode::Policy);

        let arbitration = arbiter
            .arbitrate(&query(), &GroundedAnswer::Abstained, &intrinsic(Certainty::High))
            .await
            .unwrap();

        assert_eq!(arbitration.result.provenance, Provenance::Intrinsic);
        assert!(arbitration.review.is_none());
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_model_review_disagreement_keeps_policy_decision() {
        let fake = Arc::new(ScriptedCompletionClient::new().on(
            REVIEW_INSTRUCTION,
            "Final Answer: Donna Pinciotti\nReasoning Source: RAG",
        ));
        let arbiter = Arbiter::new(
            StageClient::new(fake.clone(), "m"),
            ArbitrationMode::ModelReviewed,
        );

        let arbitration = arbiter
            .arbitrate(&query(), &GroundedAnswer::Abstained, &intrinsic(Certainty::Low))
            .await
            .unwrap();

        assert_eq!(arbitration.result, FinalResult::abstain());
        let review = arbitration.review.unwrap();
        assert_eq!(review.provenance, Provenance::Rag);
        assert!(!review.agrees);
        assert_eq!(fake.count_matching(REVIEW_INSTRUCTION), 1);
    }

    #[tokio::test]
    async fn test_model_review_garbled_reply_is_contract_violation() {
        let fake = Arc::new(ScriptedCompletionClient::new().on(REVIEW_INSTRUCTION, "I think RAG."));
        let arbiter = Arbiter::new(StageClient::new(fake, "m"), ArbitrationMode::ModelReviewed);

        let err = arbiter
            .arbitrate(&query(), &GroundedAnswer::Abstained, &intrinsic(Certainty::High))
            .await
            .unwrap_err();
        assert!(err.is_contract_violation());
    }
}
