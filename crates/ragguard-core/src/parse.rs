//! Parsing of model replies into typed stage artifacts.
//!
//! Parsing tolerates markdown emphasis, bullets, letter case and stray
//! whitespace, but never fills in a missing field: anything the reply does
//! not state is a `ContractViolation`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{
    Certainty, Framing, GroundedAnswer, IntrinsicAnswer, NoteEntry, NoteSet, Provenance,
    GROUNDED_ABSTENTION,
};
use crate::error::{stage, PipelineError, PipelineResult};

fn note_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"(?mi)^[\s>*#-]*(?:document\s*)?\[(\d+)\]\**:?").expect("note header regex")
    })
}

fn list_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"^(?:[-*+#>•]+\s*|\d+[.)]\s+)").expect("list marker regex")
    })
}

/// Strip list markers (bullets, numbering, quotes) and emphasis around a line.
fn clean_line(line: &str) -> String {
    let mut line = line.trim();
    while let Some(marker) = list_marker().find(line) {
        line = line[marker.end()..].trim_start();
    }
    line.replace("**", "").replace("__", "").replace('`', "").trim().to_string()
}

/// Drop single `*` / `_` emphasis left around a label or value.
fn strip_emphasis(text: &str) -> &str {
    text.trim().trim_matches(['*', '_']).trim()
}

/// Value of `label: value` in `block`.
///
/// A label with nothing after the colon takes the next non-empty line.
fn field(block: &str, label: &str) -> Option<String> {
    let lines: Vec<String> = block.lines().map(clean_line).collect();
    for (i, line) in lines.iter().enumerate() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if !strip_emphasis(key).eq_ignore_ascii_case(label) {
            continue;
        }
        let value = strip_emphasis(value);
        if !value.is_empty() {
            return Some(value.to_string());
        }
        return lines[i + 1..]
            .iter()
            .find(|next| !next.is_empty())
            .filter(|next| !next.contains(':'))
            .cloned();
    }
    None
}

/// First of `labels` present in `block`.
fn field_any(block: &str, labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| field(block, label))
}

/// First word of a value, lowercased, without surrounding punctuation.
fn keyword(value: &str) -> String {
    value
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_ascii_lowercase()
}

fn parse_answers_query(value: &str) -> Option<bool> {
    match keyword(value).as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

fn parse_framing(value: &str) -> Option<Framing> {
    match keyword(value).as_str() {
        "canonical" => Some(Framing::Canonical),
        "hypothetical" | "speculative" => Some(Framing::Hypothetical),
        _ => None,
    }
}

/// Parse reading notes; there must be exactly one block per document.
pub fn parse_notes(reply: &str, expected: usize) -> PipelineResult<NoteSet> {
    let headers: Vec<(usize, usize, usize)> = note_header()
        .captures_iter(reply)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let index = caps.get(1)?.as_str().parse().ok()?;
            Some((index, whole.start(), whole.end()))
        })
        .collect();

    let mut blocks: BTreeMap<usize, &str> = BTreeMap::new();
    for (i, &(index, _, body_start)) in headers.iter().enumerate() {
        let body_end = headers.get(i + 1).map_or(reply.len(), |next| next.1);
        if blocks.insert(index, &reply[body_start..body_end]).is_some() {
            return Err(PipelineError::contract(
                stage::NOTES,
                format!("document [{index}] has more than one note"),
            ));
        }
    }

    let expected_indices: Vec<usize> = (1..=expected).collect();
    let found_indices: Vec<usize> = blocks.keys().copied().collect();
    if found_indices != expected_indices {
        return Err(PipelineError::contract(
            stage::NOTES,
            format!("expected notes for documents 1..={expected}, found {found_indices:?}"),
        ));
    }

    let entries = blocks
        .into_iter()
        .map(|(document, block)| parse_note_block(document, block))
        .collect::<PipelineResult<Vec<_>>>()?;

    Ok(NoteSet::new(entries))
}

fn parse_note_block(document: usize, block: &str) -> PipelineResult<NoteEntry> {
    let missing = |what: &str| {
        PipelineError::contract(stage::NOTES, format!("note [{document}] is missing {what}"))
    };

    let claim = field(block, "claim").ok_or_else(|| missing("Claim"))?;
    let answers = field_any(
        block,
        &["answers question", "answers the question", "directly answers"],
    )
    .ok_or_else(|| missing("Answers question"))?;
    let framing = field(block, "framing").ok_or_else(|| missing("Framing"))?;

    let answers_query = parse_answers_query(&answers).ok_or_else(|| {
        PipelineError::contract(
            stage::NOTES,
            format!("note [{document}] has unrecognised Answers question value {answers:?}"),
        )
    })?;
    let framing = parse_framing(&framing).ok_or_else(|| {
        PipelineError::contract(
            stage::NOTES,
            format!("note [{document}] has unrecognised Framing value {framing:?}"),
        )
    })?;

    Ok(NoteEntry {
        document,
        claim,
        answers_query,
        framing,
    })
}

/// Parse the synthesis reply into an answer or the abstention.
pub fn parse_grounded(reply: &str) -> PipelineResult<GroundedAnswer> {
    let text = field(reply, "final answer").unwrap_or_else(|| clean_line(reply));
    let text = strip_emphasis(text.trim().trim_matches(['"', '\'']));

    if text.is_empty() {
        return Err(PipelineError::contract(
            stage::SYNTHESIS,
            "reply has no answer text",
        ));
    }

    let sentinel = GROUNDED_ABSTENTION.trim_end_matches('.').to_ascii_lowercase();
    if text.to_ascii_lowercase().contains(&sentinel) {
        return Ok(GroundedAnswer::Abstained);
    }
    Ok(GroundedAnswer::Canonical(text.to_string()))
}

fn parse_certainty(value: &str) -> Option<Certainty> {
    // An echoed template ("High / Medium / Low") is not a self-assessment.
    if value.contains('/') {
        return None;
    }
    match keyword(value).as_str() {
        "high" => Some(Certainty::High),
        "medium" => Some(Certainty::Medium),
        "low" => Some(Certainty::Low),
        _ => None,
    }
}

/// Parse the intrinsic reply; all three fields are required.
pub fn parse_intrinsic(reply: &str) -> PipelineResult<IntrinsicAnswer> {
    let missing =
        |what: &str| PipelineError::contract(stage::INTRINSIC, format!("reply is missing {what}"));

    let answer = field(reply, "answer").ok_or_else(|| missing("Answer"))?;
    let justification = field(reply, "justification").ok_or_else(|| missing("Justification"))?;
    let certainty_raw = field(reply, "certainty").ok_or_else(|| missing("Certainty"))?;

    let certainty = parse_certainty(&certainty_raw).ok_or_else(|| {
        PipelineError::contract(
            stage::INTRINSIC,
            format!("unrecognised Certainty value {certainty_raw:?}"),
        )
    })?;

    Ok(IntrinsicAnswer {
        answer,
        justification,
        certainty,
    })
}

/// Parse the arbiter review reply into the model's answer and source.
pub fn parse_review(reply: &str) -> PipelineResult<(String, Provenance)> {
    let missing =
        |what: &str| PipelineError::contract(stage::ARBITER, format!("reply is missing {what}"));

    let answer = field(reply, "final answer").ok_or_else(|| missing("Final Answer"))?;
    let source = field(reply, "reasoning source").ok_or_else(|| missing("Reasoning Source"))?;

    let provenance = match keyword(&source).as_str() {
        "rag" => Provenance::Rag,
        "intrinsic" => Provenance::Intrinsic,
        "abstain" => Provenance::Abstain,
        _ => {
            return Err(PipelineError::contract(
                stage::ARBITER,
                format!("unrecognised Reasoning Source {source:?}"),
            ))
        }
    };

    Ok((answer, provenance))
}
