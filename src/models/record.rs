//! Per-document lifecycle records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifier::DocumentId;

/// Step label the service uses once identification finished.
pub const IDENTIFICATION_COMPLETED: &str = "Identification Completed";
/// Step label for a document whose analysis is stored.
pub const ANALYSIS_COMPLETED: &str = "Analysis Completed";

/// Where a tracked document is in its lifecycle.
///
/// `Unknown` is never stored: an untracked identifier simply has no record.
/// Variants are ordered, so `a < b` means `b` is further along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStep {
    /// The service reported an intermediate step such as "Downloading PDF".
    InProgress,
    IdentificationCompleted,
    AnalysisCompleted,
}

impl LifecycleStep {
    /// Map a service-supplied step name onto a lifecycle step.
    ///
    /// Identification responses never carry analysis output, so an
    /// "Analysis Completed" label there cannot be honored and maps to
    /// `IdentificationCompleted`.
    pub fn from_identification_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty()
            || normalized == IDENTIFICATION_COMPLETED.to_lowercase()
            || normalized == ANALYSIS_COMPLETED.to_lowercase()
        {
            Self::IdentificationCompleted
        } else {
            Self::InProgress
        }
    }
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStep::InProgress => write!(f, "In Progress"),
            LifecycleStep::IdentificationCompleted => write!(f, "{}", IDENTIFICATION_COMPLETED),
            LifecycleStep::AnalysisCompleted => write!(f, "{}", ANALYSIS_COMPLETED),
        }
    }
}

/// Stage-specific record data.
///
/// Analysis lines live only inside `Analyzed`, so a record cannot hold
/// analysis output without being at `AnalysisCompleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Service-reported intermediate step, kept verbatim for display.
    InProgress { label: String },
    Identified,
    Analyzed { lines: Vec<String> },
}

impl Stage {
    pub fn step(&self) -> LifecycleStep {
        match self {
            Stage::InProgress { .. } => LifecycleStep::InProgress,
            Stage::Identified => LifecycleStep::IdentificationCompleted,
            Stage::Analyzed { .. } => LifecycleStep::AnalysisCompleted,
        }
    }
}

/// Lifecycle record for one tracked document.
///
/// Records only exist once the service has named a document type, so the
/// type is not optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub document_type: String,
    /// Text the service extracted for analysis; informational only.
    pub optimized_text: Option<String>,
    pub stage: Stage,
    /// Summary text covering this record's document type, once summarized.
    pub summary: Option<String>,
}

impl DocumentRecord {
    /// Create a record from a successful identification.
    pub fn identified(
        id: DocumentId,
        document_type: String,
        step_label: Option<&str>,
        optimized_text: Option<String>,
    ) -> Self {
        Self {
            id,
            document_type,
            optimized_text,
            stage: stage_for_label(step_label),
            summary: None,
        }
    }

    pub fn step(&self) -> LifecycleStep {
        self.stage.step()
    }

    /// Analysis lines, present only at `AnalysisCompleted`.
    pub fn analysis_lines(&self) -> Option<&[String]> {
        match &self.stage {
            Stage::Analyzed { lines } => Some(lines),
            _ => None,
        }
    }

    /// Label to show for the current step.
    pub fn step_label(&self) -> String {
        match &self.stage {
            Stage::InProgress { label } => label.clone(),
            other => other.step().to_string(),
        }
    }

    /// Merge a repeated identification into this record.
    ///
    /// Type and optimized text are refreshed; the stage only moves forward.
    pub fn merge_identification(
        &mut self,
        document_type: String,
        step_label: Option<&str>,
        optimized_text: Option<String>,
    ) {
        self.document_type = document_type;
        if optimized_text.is_some() {
            self.optimized_text = optimized_text;
        }

        let incoming = stage_for_label(step_label);
        if incoming.step() > self.step() {
            self.stage = incoming;
        } else if let (Stage::InProgress { label }, Stage::InProgress { label: new_label }) =
            (&mut self.stage, incoming)
        {
            *label = new_label;
        }
    }

    /// Store analysis output, replacing any earlier output.
    pub fn set_analysis(&mut self, lines: Vec<String>) {
        self.stage = Stage::Analyzed { lines };
    }

    /// Analysis lines joined back into the combined response text.
    pub fn combined_analysis(&self) -> Option<String> {
        self.analysis_lines().map(|lines| lines.join("\n"))
    }
}

fn stage_for_label(label: Option<&str>) -> Stage {
    match label {
        None => Stage::Identified,
        Some(label) => match LifecycleStep::from_identification_label(label) {
            LifecycleStep::InProgress => Stage::InProgress {
                label: label.trim().to_string(),
            },
            _ => Stage::Identified,
        },
    }
}

/// Split a combined analysis response into lines.
///
/// Splits on `\n` and drops a trailing `\r` from each line; nothing else is
/// altered, so the same response always yields the same lines.
pub fn split_analysis_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
