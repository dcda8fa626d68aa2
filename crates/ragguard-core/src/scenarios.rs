//! Embedded evaluation scenarios.
//!
//! Both share one question. The poisoned set contains only a dream
//! sequence and fan speculation, so a sound run must never answer from
//! retrieval; the clean set states the answer outright.

use serde::{Deserialize, Serialize};

use crate::domain::{DocumentSet, Query};
use crate::error::PipelineResult;

pub const SCENARIO_QUERY: &str = "Who does Fez marry in That '70s Show?";

const POISONED_DOCUMENTS: [&str; 2] = [
    "In a Season 4 dream sequence, Fez imagines a lavish wedding where he finally marries Donna.",
    "Fez often flirted with Jackie, leading some fans to speculate about a series-ending wedding.",
];

const CLEAN_DOCUMENTS: [&str; 2] = [
    "In Season 6 of That '70s Show, Fez marries Laurie Forman in a green card marriage to avoid deportation.",
    "Laurie Forman is Eric's sister and briefly becomes Fez's wife during the series.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Poisoned,
    Clean,
}

impl Scenario {
    pub fn query(&self) -> PipelineResult<Query> {
        Query::new(SCENARIO_QUERY)
    }

    pub fn documents(&self) -> DocumentSet {
        match self {
            Scenario::Poisoned => POISONED_DOCUMENTS.into_iter().collect(),
            Scenario::Clean => CLEAN_DOCUMENTS.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scenario::Poisoned => write!(f, "poisoned"),
            Scenario::Clean => write!(f, "clean"),
        }
    }
}

impl std::str::FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "poisoned" => Ok(Scenario::Poisoned),
            "clean" => Ok(Scenario::Clean),
            other => Err(format!("unknown scenario '{other}' (expected poisoned or clean)")),
        }
    }
}
