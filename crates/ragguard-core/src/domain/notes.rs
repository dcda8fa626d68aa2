//! Reading notes derived from the retrieved documents.

use serde::{Deserialize, Serialize};

/// How a document words its claim.
///
/// This is a linguistic classification of the wording, not a truth
/// judgment: "in a dream sequence", "imagines", "some fans speculate" and
/// conditional phrasing are hypothetical; declarative assertions are
/// canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    Canonical,
    Hypothetical,
}

impl std::fmt::Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Framing::Canonical => write!(f, "canonical"),
            Framing::Hypothetical => write!(f, "hypothetical"),
        }
    }
}

/// Note for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    /// 1-based position of the source document.
    pub document: usize,
    /// The document's main claim, as stated.
    pub claim: String,
    /// Whether the document directly answers the question.
    pub answers_query: bool,
    pub framing: Framing,
}

impl NoteEntry {
    /// A canonical claim that directly answers the question.
    pub fn supports_answer(&self) -> bool {
        self.answers_query && self.framing == Framing::Canonical
    }
}

/// One note per document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteSet(Vec<NoteEntry>);

impl NoteSet {
    pub fn new(entries: Vec<NoteEntry>) -> Self {
        NoteSet(entries)
    }

    pub fn empty() -> Self {
        NoteSet(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[NoteEntry] {
        &self.0
    }

    /// First note whose canonical claim directly answers the question.
    pub fn first_supporting(&self) -> Option<&NoteEntry> {
        self.0.iter().find(|note| note.supports_answer())
    }

    /// Render the notes back into the line format used in prompts.
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|note| {
                format!(
                    "[{}]\nClaim: {}\nAnswers question: {}\nFraming: {}",
                    note.document,
                    note.claim,
                    if note.answers_query { "yes" } else { "no" },
                    note.framing
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
