//! Serializable read-only view of the store for presentation.

use std::collections::BTreeMap;

use serde::Serialize;

use super::DocumentStore;
use crate::models::{structure_lines, AnalysisItem, DocumentId, LifecycleStep};

/// One document card.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub id: DocumentId,
    pub document_type: String,
    pub step: LifecycleStep,
    pub step_label: String,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_lines: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub analysis_items: Vec<AnalysisItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Everything a renderer needs, detached from the store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub documents: Vec<DocumentView>,
    pub summaries_by_type: BTreeMap<String, String>,
    pub can_summarize: bool,
    pub diagnostic_count: usize,
}

impl StoreSnapshot {
    pub(super) fn from_store(store: &DocumentStore) -> Self {
        let documents = store
            .records()
            .map(|record| {
                let analysis_lines = record.analysis_lines().map(<[String]>::to_vec);
                let analysis_items = analysis_lines
                    .as_deref()
                    .map(structure_lines)
                    .unwrap_or_default();

                DocumentView {
                    id: record.id.clone(),
                    document_type: record.document_type.clone(),
                    step: record.step(),
                    step_label: record.step_label(),
                    selected: store.selection().contains(&record.id),
                    analysis_lines,
                    analysis_items,
                    summary: record.summary.clone(),
                }
            })
            .collect();

        Self {
            documents,
            summaries_by_type: store.summaries_by_type().clone(),
            can_summarize: store.can_summarize(),
            diagnostic_count: store.diagnostics().len(),
        }
    }
}
