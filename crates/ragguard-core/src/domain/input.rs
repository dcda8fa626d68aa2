//! Pipeline inputs: the question and the already-retrieved documents.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PipelineError, PipelineResult};

/// A natural-language question. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> PipelineResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        Ok(Query(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Query {
    type Error = PipelineError;

    fn try_from(text: String) -> PipelineResult<Self> {
        Query::new(text)
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A passage supplied by an upstream retriever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(String);

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Document(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

/// Ordered documents for one run.
///
/// Position (1-based) is only a display reference; it never implies rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSet(Vec<Document>);

impl DocumentSet {
    pub fn new(documents: Vec<Document>) -> Self {
        DocumentSet(documents)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.0.iter()
    }

    /// Documents paired with their 1-based position.
    pub fn iter_numbered(&self) -> impl Iterator<Item = (usize, &Document)> {
        self.0.iter().enumerate().map(|(i, doc)| (i + 1, doc))
    }

    /// SHA-256 hex over the ordered, length-prefixed document texts.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for doc in &self.0 {
            hasher.update((doc.text().len() as u64).to_le_bytes());
            hasher.update(doc.text().as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

impl<S: Into<String>> FromIterator<S> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        DocumentSet(iter.into_iter().map(Document::new).collect())
    }
}
