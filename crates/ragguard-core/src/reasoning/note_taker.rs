//! Constrained note-taking over the retrieved documents.

use tracing::{debug, instrument};

use crate::domain::{DocumentSet, NoteSet, Query};
use crate::error::PipelineResult;
use crate::parse::parse_notes;
use crate::prompts::build_notes_prompt;
use crate::reasoning::StageClient;

/// Turns a document set into exactly one note per document, in order.
#[derive(Debug, Clone)]
pub struct NoteTaker {
    client: StageClient,
}

impl NoteTaker {
    pub fn new(client: StageClient) -> Self {
        NoteTaker { client }
    }

    /// An empty document set yields an empty note set without a request.
    #[instrument(skip_all, fields(documents = docs.len()))]
    pub async fn take_notes(&self, query: &Query, docs: &DocumentSet) -> PipelineResult<NoteSet> {
        if docs.is_empty() {
            debug!("no documents, skipping note request");
            return Ok(NoteSet::empty());
        }

        let reply = self.client.ask(build_notes_prompt(query, docs)).await?;
        parse_notes(&reply, docs.len())
    }
}
