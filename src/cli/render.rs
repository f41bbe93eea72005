//! Terminal rendering of document cards and summaries.

use std::collections::BTreeMap;

use console::style;

use crate::models::LifecycleStep;
use crate::store::{DocumentView, StoreSnapshot};

/// Render one document card.
pub fn format_card(doc: &DocumentView) -> String {
    let checkbox = if doc.selected { "[x]" } else { "[ ]" };
    let step = match doc.step {
        LifecycleStep::AnalysisCompleted => style(doc.step_label.as_str()).green(),
        LifecycleStep::IdentificationCompleted => style(doc.step_label.as_str()).cyan(),
        LifecycleStep::InProgress => style(doc.step_label.as_str()).yellow(),
    };

    let mut out = format!(
        "{} {}\n    Type: {}\n    Step: {}\n",
        checkbox,
        style(doc.id.as_str()).bold(),
        doc.document_type,
        step
    );

    if !doc.analysis_items.is_empty() {
        out.push_str("    Analysis:\n");
        for item in &doc.analysis_items {
            out.push_str(&format!("      • {}\n", item.main));
            for sub in &item.sub_items {
                out.push_str(&format!("          - {}\n", sub));
            }
        }
    }

    if let Some(summary) = &doc.summary {
        out.push_str(&format!("    Summary: {}\n", style(summary).dim()));
    }

    out
}

/// Render the summary card.
///
/// Types with a blank summary are left out.
pub fn format_summaries(summaries: &BTreeMap<String, String>) -> String {
    let mut out = format!("{}\n", style("Summary").bold().underlined());
    for (doc_type, text) in summaries {
        if text.trim().is_empty() {
            continue;
        }
        out.push_str(&format!("{}:\n", style(doc_type).bold()));
        for line in text.lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }
    out
}

/// Print every card, then the summary card if any.
pub fn print_snapshot(snapshot: &StoreSnapshot) {
    if snapshot.documents.is_empty() {
        println!("{}", style("No documents identified.").dim());
    }
    for doc in &snapshot.documents {
        println!("{}", format_card(doc));
    }
    if !snapshot.summaries_by_type.is_empty() {
        print!("{}", format_summaries(&snapshot.summaries_by_type));
    }
    if snapshot.diagnostic_count > 0 {
        println!(
            "{} {} request(s) failed; run with -v for details",
            style("!").yellow(),
            snapshot.diagnostic_count
        );
    }
}

/// Print the snapshot as pretty JSON.
pub fn print_json(snapshot: &StoreSnapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}
