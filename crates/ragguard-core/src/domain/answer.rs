//! Stage outputs and the terminal result of a run.

use serde::{Deserialize, Serialize};

/// Grounded synthesis found no canonical direct answer in the notes.
pub const GROUNDED_ABSTENTION: &str = "Insufficient information from retrieved documents.";

/// Neither source was reliable enough to answer.
pub const FINAL_ABSTENTION: &str = "Insufficient reliable information.";

/// Answer derived solely from the reading notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "answer", rename_all = "snake_case")]
pub enum GroundedAnswer {
    Canonical(String),
    Abstained,
}

impl GroundedAnswer {
    pub fn is_abstention(&self) -> bool {
        matches!(self, GroundedAnswer::Abstained)
    }

    /// Answer text, or [`GROUNDED_ABSTENTION`].
    pub fn text(&self) -> &str {
        match self {
            GroundedAnswer::Canonical(text) => text,
            GroundedAnswer::Abstained => GROUNDED_ABSTENTION,
        }
    }
}

/// Self-reported confidence of the intrinsic reasoner. Not calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Certainty {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Certainty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Certainty::High => write!(f, "High"),
            Certainty::Medium => write!(f, "Medium"),
            Certainty::Low => write!(f, "Low"),
        }
    }
}

/// Answer drawn from the model's internal knowledge only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrinsicAnswer {
    pub answer: String,
    pub justification: String,
    pub certainty: Certainty,
}

/// Which source produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "RAG")]
    Rag,
    Intrinsic,
    Abstain,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Rag => write!(f, "RAG"),
            Provenance::Intrinsic => write!(f, "Intrinsic"),
            Provenance::Abstain => write!(f, "Abstain"),
        }
    }
}

/// Terminal output of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    pub answer: String,
    pub provenance: Provenance,
}

impl FinalResult {
    pub fn abstain() -> Self {
        FinalResult {
            answer: FINAL_ABSTENTION.to_string(),
            provenance: Provenance::Abstain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_stay_distinct() {
        assert_ne!(GROUNDED_ABSTENTION, FINAL_ABSTENTION);
        assert_eq!(GroundedAnswer::Abstained.text(), GROUNDED_ABSTENTION);
        assert_eq!(FinalResult::abstain().answer, FINAL_ABSTENTION);
    }

    #[test]
    fn test_provenance_serializes_as_tag_names() {
        assert_eq!(serde_json::to_string(&Provenance::Rag).unwrap(), r#""RAG""#);
        assert_eq!(
            serde_json::to_string(&Provenance::Intrinsic).unwrap(),
            r#""Intrinsic""#
        );
        assert_eq!(Provenance::Abstain.to_string(), "Abstain");
    }

    #[test]
    fn test_grounded_answer_json_shape() {
        let json = serde_json::to_value(GroundedAnswer::Canonical("Laurie".into())).unwrap();
        assert_eq!(json["kind"], "canonical");
        assert_eq!(json["answer"], "Laurie");

        let json = serde_json::to_value(GroundedAnswer::Abstained).unwrap();
        assert_eq!(json["kind"], "abstained");
    }
}
