//! Human-readable rendering of pipeline output.

use ragguard_core::{FinalResult, GroundedAnswer, RunReport};

pub fn render_result(result: &FinalResult) -> String {
    format!(
        "Final Answer: {}\nReasoning Source: {}",
        result.answer, result.provenance
    )
}

/// Stage-by-stage narration of a run.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Run: {}\n", report.run_id));
    out.push_str(&format!("Question: {}\n\n", report.query));

    out.push_str("Step 1: Reading Notes\n");
    if report.notes.is_empty() {
        out.push_str("  (no documents)\n");
    }
    for note in report.notes.entries() {
        out.push_str(&format!(
            "  [{}] {}\n      answers question: {}, framing: {}\n",
            note.document,
            note.claim,
            if note.answers_query { "yes" } else { "no" },
            note.framing
        ));
    }

    out.push_str("\nStep 2: Grounded Answer\n");
    let grounded_kind = match report.grounded {
        GroundedAnswer::Canonical(_) => "canonical",
        GroundedAnswer::Abstained => "abstained",
    };
    out.push_str(&format!("  {} ({})\n", report.grounded.text(), grounded_kind));

    out.push_str("\nStep 3: Intrinsic Answer\n");
    out.push_str(&format!(
        "  {}\n  Justification: {}\n  Certainty: {}\n",
        report.intrinsic.answer, report.intrinsic.justification, report.intrinsic.certainty
    ));

    if let Some(review) = &report.review {
        out.push_str("\nModel Review\n");
        out.push_str(&format!(
            "  {} (source: {}, agrees with policy: {})\n",
            review.answer,
            review.provenance,
            if review.agrees { "yes" } else { "no" }
        ));
    }

    out.push_str("\nStep 4: Final Result\n");
    out.push_str(&render_result(&report.result));
    out.push('\n');
    out
}
