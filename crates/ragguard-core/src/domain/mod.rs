//! Domain model for a single pipeline run.
//!
//! - [`input`]: `Query`, `Document`, `DocumentSet`
//! - [`notes`]: `Framing`, `NoteEntry`, `NoteSet`
//! - [`answer`]: `GroundedAnswer`, `IntrinsicAnswer`, `FinalResult` and their sentinels

pub mod answer;
pub mod input;
pub mod notes;

pub use answer::{
    Certainty, FinalResult, GroundedAnswer, IntrinsicAnswer, Provenance, FINAL_ABSTENTION,
    GROUNDED_ABSTENTION,
};
pub use input::{Document, DocumentSet, Query};
pub use notes::{Framing, NoteEntry, NoteSet};
