//! Grouping of analysis lines into main items with sub-items.

use serde::Serialize;

/// One rendered analysis entry: a main line and the bullet lines under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisItem {
    pub main: String,
    pub sub_items: Vec<String>,
}

const BULLETS: [char; 3] = ['-', '*', '•'];

/// Group analysis lines for display.
///
/// Blank lines are skipped. Lines that are indented or start with a bullet
/// attach to the preceding main line; a bullet with no preceding main line
/// becomes a main line itself.
pub fn structure_lines<S: AsRef<str>>(lines: &[S]) -> Vec<AnalysisItem> {
    let mut items: Vec<AnalysisItem> = Vec::new();

    for line in lines {
        let line = line.as_ref();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let indented = line.starts_with([' ', '\t']);
        let bullet = trimmed.strip_prefix(BULLETS).map(str::trim);

        match (bullet, indented, items.last_mut()) {
            (Some(text), _, Some(last)) => last.sub_items.push(text.to_string()),
            (None, true, Some(last)) => last.sub_items.push(trimmed.to_string()),
            (Some(text), _, None) => items.push(AnalysisItem {
                main: text.to_string(),
                sub_items: Vec::new(),
            }),
            _ => items.push(AnalysisItem {
                main: trimmed.to_string(),
                sub_items: Vec::new(),
            }),
        }
    }

    items
}
