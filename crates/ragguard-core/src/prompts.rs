//! Prompts for the four reasoning stages
//!
//! Each prompt opens with a fixed instruction line so the stages stay
//! distinguishable in endpoint logs, and asks for a line-oriented reply
//! that `parse` can turn into typed artifacts.

use crate::domain::{
    DocumentSet, GroundedAnswer, IntrinsicAnswer, NoteSet, Query, FINAL_ABSTENTION,
    GROUNDED_ABSTENTION,
};

/// Opening line of the reading-notes prompt
pub const NOTES_INSTRUCTION: &str = "You are generating reading notes for retrieved documents.";

/// Opening line of the grounded synthesis prompt
pub const SYNTHESIS_INSTRUCTION: &str = "Based only on the reading notes below:";

/// Opening line of the intrinsic reasoning prompt
pub const INTRINSIC_INSTRUCTION: &str = "Ignore all retrieved documents.";

/// Opening line of the arbiter review prompt
pub const REVIEW_INSTRUCTION: &str = "You are merging two reasoning sources.";

/// Build the reading-notes prompt; documents are numbered from 1 in input order
pub fn build_notes_prompt(query: &Query, docs: &DocumentSet) -> String {
    let documents = docs
        .iter_numbered()
        .map(|(n, doc)| format!("[{n}] {}", doc.text()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{NOTES_INSTRUCTION}

STRICT RULE:
Only describe what is explicitly stated in each document.
Do NOT use outside knowledge.
Do NOT infer beyond the document.

For each document:

1. State its main factual claim.
2. State whether it directly answers the question.
3. State whether it appears canonical or hypothetical based only on wording.
   Dream sequences, imagined events, fan speculation and conditional phrasing are hypothetical.
   Plain statements of what happened are canonical.

Write exactly one block per document ({count} in total), in document order, in this format:

[<document number>]
Claim: <main claim>
Answers question: yes | no
Framing: canonical | hypothetical

Question:
{query}

Documents:
{documents}

Reading Notes:
"#,
        count = docs.len(),
    )
}

/// Build the grounded synthesis prompt
pub fn build_synthesis_prompt(query: &Query, notes: &NoteSet) -> String {
    format!(
        r#"{SYNTHESIS_INSTRUCTION}

1. If any note explicitly contains a canonical direct answer, return that answer.
2. If notes are hypothetical, speculative, or do not directly answer, respond with:
"{GROUNDED_ABSTENTION}"

Do NOT use outside knowledge.
Reply with the answer alone, without explanation.

Question:
{query}

Reading Notes:
{notes}

Final Answer:
"#,
        notes = notes.render(),
    )
}

/// Build the intrinsic reasoning prompt; it never sees the documents
pub fn build_intrinsic_prompt(query: &Query) -> String {
    format!(
        r#"{INTRINSIC_INSTRUCTION}

Using only your internal knowledge:

Question:
{query}

Provide exactly these three lines:

Answer: <text>
Justification: <brief explanation>
Certainty: <one of High, Medium, Low>
"#
    )
}

/// Build the arbiter review prompt
pub fn build_review_prompt(
    query: &Query,
    grounded: &GroundedAnswer,
    intrinsic: &IntrinsicAnswer,
) -> String {
    format!(
        r#"{REVIEW_INSTRUCTION}

Question:
{query}

RAG-Based Result:
{grounded}

Intrinsic Knowledge Result:
Answer: {answer}
Justification: {justification}
Certainty: {certainty}

Decision Rules:
1. If RAG contains a clear canonical answer, prefer RAG.
2. If RAG says insufficient but intrinsic is certain, use intrinsic.
3. If both are uncertain or conflicting, say:
"{FINAL_ABSTENTION}"

Return:

Final Answer: <text>
Reasoning Source: RAG / Intrinsic / Abstain
"#,
        grounded = grounded.text(),
        answer = intrinsic.answer,
        justification = intrinsic.justification,
        certainty = intrinsic.certainty,
    )
}
