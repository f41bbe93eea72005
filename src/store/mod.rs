//! Document status store.
//!
//! Accumulates, per document, the identification → analysis → summarization
//! lifecycle from service responses. Pure state transitions: the store never
//! talks to the service itself, the session feeds it results.
//!
//! A store lives for one session and is dropped with it.

mod diagnostics;
mod selection;
mod snapshot;

pub use diagnostics::{Diagnostic, Operation};
pub use selection::SelectionSet;
pub use snapshot::{DocumentView, StoreSnapshot};

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    split_analysis_lines, DocumentId, DocumentRecord, IdentifyEntry, IdentifyResponse,
    LifecycleStep, SummarizeResponse, SummaryEntry,
};
use crate::service::{FailureKind, ServiceError};

/// Errors raised by store operations that require existing state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document is not tracked: {0}")]
    UnknownDocument(DocumentId),

    #[error("No selected document has analysis output to summarize")]
    NothingToSummarize,
}

/// Per-document lifecycle records plus selection and summaries.
#[derive(Debug, Default)]
pub struct DocumentStore {
    records: HashMap<DocumentId, DocumentRecord>,
    /// Identifiers in first-seen order, for stable rendering.
    order: Vec<DocumentId>,
    selection: SelectionSet,
    summaries_by_type: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
    /// Last rejection message per response key, so a status map that repeats
    /// a stale entry on every call is only reported once.
    rejected_entries: HashMap<String, String>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &DocumentId) -> Option<&DocumentRecord> {
        self.records.get(id)
    }

    /// Tracked identifiers in first-seen order.
    pub fn ids(&self) -> &[DocumentId] {
        &self.order
    }

    /// Records in first-seen order.
    pub fn records(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn summaries_by_type(&self) -> &BTreeMap<String, String> {
        &self.summaries_by_type
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Merge an identification (or status) response.
    ///
    /// Entries with a document type create or update records; entries with an
    /// `error` or with no type are recorded as diagnostics and skipped. A
    /// rejection identical to the last one recorded for the same key is not
    /// recorded again. Returns the identifiers that were merged.
    pub fn apply_identification(
        &mut self,
        operation: Operation,
        response: IdentifyResponse,
    ) -> Vec<DocumentId> {
        let mut merged = Vec::new();

        for (raw_id, entry) in response {
            let Some(id) = DocumentId::normalize(&raw_id) else {
                self.reject_entry(
                    operation,
                    &raw_id,
                    FailureKind::MalformedResponse,
                    "Response entry has an empty identifier".to_string(),
                    &entry,
                );
                continue;
            };

            let document_type = entry
                .document_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty());

            let Some(document_type) = document_type else {
                let (kind, message) = match &entry.error {
                    Some(err) => (FailureKind::ServiceFailure, err.clone()),
                    None => (
                        FailureKind::MalformedResponse,
                        "Response entry has no document_type".to_string(),
                    ),
                };
                self.reject_entry(operation, id.as_str(), kind, message, &entry);
                continue;
            };
            let document_type = document_type.to_string();
            self.rejected_entries.remove(id.as_str());

            match self.records.get_mut(&id) {
                Some(record) => {
                    record.merge_identification(
                        document_type,
                        entry.step.as_deref(),
                        entry.optimized_text,
                    );
                    debug!(id = %id, step = %record.step(), "identification merged");
                }
                None => {
                    let record = DocumentRecord::identified(
                        id.clone(),
                        document_type,
                        entry.step.as_deref(),
                        entry.optimized_text,
                    );
                    info!(id = %id, document_type = %record.document_type, "document identified");
                    self.records.insert(id.clone(), record);
                    self.order.push(id.clone());
                }
            }
            merged.push(id);
        }

        merged
    }

    /// Store a successful analysis, overwriting earlier output.
    pub fn apply_analysis(&mut self, id: &DocumentId, combined: &str) -> Result<(), StoreError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownDocument(id.clone()))?;
        let lines = split_analysis_lines(combined);
        info!(id = %id, lines = lines.len(), "analysis stored");
        record.set_analysis(lines);
        Ok(())
    }

    /// Record a failed service call without touching any record.
    pub fn record_failure(&mut self, operation: Operation, identifier: Option<&str>, err: &ServiceError) {
        self.push_diagnostic(Diagnostic::from_error(operation, identifier, err));
    }

    /// Record a diagnostic built by the caller.
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn reject_entry(
        &mut self,
        operation: Operation,
        key: &str,
        kind: FailureKind,
        message: String,
        entry: &IdentifyEntry,
    ) {
        if self.rejected_entries.get(key) == Some(&message) {
            debug!(id = %key, "skipping repeated rejection");
            return;
        }
        self.push_diagnostic(Diagnostic::new(
            operation,
            Some(key),
            kind,
            message.as_str(),
            serde_json::to_string(entry).ok(),
        ));
        self.rejected_entries.insert(key.to_string(), message);
    }

    /// Flip selection for a tracked, identified document.
    ///
    /// Returns the new membership, or `None` when the id is not tracked or
    /// has not finished identification.
    pub fn toggle_selection(&mut self, id: &DocumentId) -> Option<bool> {
        if !self.is_selectable(id) {
            debug!(id = %id, "ignoring selection toggle for unselectable document");
            return None;
        }
        Some(self.selection.toggle(id))
    }

    /// Select a document if selectable; returns whether it is now selected.
    pub fn select(&mut self, id: &DocumentId) -> bool {
        if !self.is_selectable(id) {
            return false;
        }
        self.selection.insert(id);
        true
    }

    /// Select every identified document.
    pub fn select_all(&mut self) -> usize {
        let ids: Vec<DocumentId> = self
            .order
            .iter()
            .filter(|id| self.is_selectable(id))
            .cloned()
            .collect();
        for id in &ids {
            self.selection.insert(id);
        }
        ids.len()
    }

    fn is_selectable(&self, id: &DocumentId) -> bool {
        self.records
            .get(id)
            .is_some_and(|r| r.step() >= LifecycleStep::IdentificationCompleted)
    }

    /// Build the summarization payload from selected documents.
    ///
    /// Selected documents without analysis output are left out; callers are
    /// expected to gate summarization on [`Self::can_summarize`].
    pub fn summary_request(&self) -> Vec<SummaryEntry> {
        self.order
            .iter()
            .filter(|id| self.selection.contains(id))
            .filter_map(|id| self.records.get(id))
            .filter_map(|record| match record.combined_analysis() {
                Some(combined) => Some(SummaryEntry {
                    document_type: record.document_type.clone(),
                    combined_response: combined,
                }),
                None => {
                    warn!(id = %record.id, "selected document has no analysis, leaving it out");
                    None
                }
            })
            .collect()
    }

    /// Merge summaries keyed by document type.
    ///
    /// Blank summaries (a type with no selected documents) are dropped. Each
    /// record whose document type contains a summary key (case-insensitive)
    /// also gets that summary. Returns how many summaries were kept.
    pub fn apply_summaries(&mut self, summaries: SummarizeResponse) -> usize {
        let summaries: SummarizeResponse = summaries
            .into_iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .collect();

        for record in self.records.values_mut() {
            let record_type = record.document_type.to_lowercase();
            if let Some(summary) = summaries
                .iter()
                .find(|(doc_type, _)| {
                    !doc_type.is_empty() && record_type.contains(&doc_type.to_lowercase())
                })
                .map(|(_, summary)| summary.clone())
            {
                record.summary = Some(summary);
            }
        }

        let kept = summaries.len();
        info!(types = kept, "summaries merged");
        self.summaries_by_type.extend(summaries);
        kept
    }

    /// Whether summarization should be offered: every tracked document
    /// has reached `AnalysisCompleted`.
    pub fn can_summarize(&self) -> bool {
        !self.records.is_empty()
            && self
                .records
                .values()
                .all(|r| r.step() == LifecycleStep::AnalysisCompleted)
    }

    /// Read-only view for presentation.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot::from_store(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> DocumentId {
        DocumentId::normalize(s).unwrap()
    }

    fn identified(entries: &[(&str, &str)]) -> IdentifyResponse {
        entries
            .iter()
            .map(|(url, doc_type)| {
                (
                    url.to_string(),
                    IdentifyEntry {
                        document_type: Some(doc_type.to_string()),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_identification_creates_records() {
        let mut store = DocumentStore::new();
        let merged = store.apply_identification(
            Operation::Identify,
            identified(&[("http://a.com/x.pdf", "Bank Statement")]),
        );
        assert_eq!(merged, vec![id("http://a.com/x.pdf")]);
        let record = store.get(&id("http://a.com/x.pdf")).unwrap();
        assert_eq!(record.document_type, "Bank Statement");
        assert_eq!(record.step(), LifecycleStep::IdentificationCompleted);
    }

    #[test]
    fn test_equivalent_keys_collapse() {
        let mut store = DocumentStore::new();
        store.apply_identification(
            Operation::Identify,
            identified(&[("//cdn.example.com/a.pdf", "Bank Statement")]),
        );
        store.apply_identification(
            Operation::Identify,
            identified(&[("https://cdn.example.com/a.pdf", "Bank Statement")]),
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.ids().len(), 1);
    }

    #[test]
    fn test_entries_without_type_become_diagnostics() {
        let mut store = DocumentStore::new();
        let mut response = identified(&[("http://a.com/x.pdf", "Bank Statement")]);
        response.insert(
            "http://b.com/y.pdf".to_string(),
            IdentifyEntry {
                step: Some("Identifying document type".into()),
                error: Some("context length exceeded".into()),
                ..Default::default()
            },
        );
        response.insert("http://c.com/z.pdf".to_string(), IdentifyEntry::default());

        let merged = store.apply_identification(Operation::Identify, response);
        assert_eq!(merged.len(), 1);
        assert_eq!(store.len(), 1);

        let kinds: Vec<FailureKind> = store.diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![FailureKind::ServiceFailure, FailureKind::MalformedResponse]
        );
        assert_eq!(store.diagnostics()[0].message, "context length exceeded");
    }

    #[test]
    fn test_repeated_entry_errors_recorded_once() {
        let mut store = DocumentStore::new();
        let failed = || {
            let mut response = identified(&[("http://a.com/x.pdf", "Bank Statement")]);
            response.insert(
                "http://b.com/y.pdf".to_string(),
                IdentifyEntry {
                    error: Some("Failed to download PDF".into()),
                    ..Default::default()
                },
            );
            response
        };

        store.apply_identification(Operation::Identify, failed());
        store.apply_identification(Operation::Identify, failed());
        store.apply_identification(Operation::CheckStatus, failed());
        assert_eq!(store.diagnostics().len(), 1);

        // A different error for the same key is new information.
        let mut changed = failed();
        changed.get_mut("http://b.com/y.pdf").unwrap().error = Some("Timed out".into());
        store.apply_identification(Operation::Identify, changed);
        assert_eq!(store.diagnostics().len(), 2);

        // Once the document identifies, a later failure is reported again.
        store.apply_identification(
            Operation::Identify,
            identified(&[("http://b.com/y.pdf", "Bank Statement")]),
        );
        store.apply_identification(Operation::Identify, failed());
        assert_eq!(store.diagnostics().len(), 3);
    }

    #[test]
    fn test_analysis_requires_record() {
        let mut store = DocumentStore::new();
        let err = store
            .apply_analysis(&id("http://a.com/x.pdf"), "Balance: 100")
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownDocument(_)));
    }

    #[test]
    fn test_reanalysis_overwrites() {
        let mut store = DocumentStore::new();
        let a = id("http://a.com/x.pdf");
        store.apply_identification(
            Operation::Identify,
            identified(&[("http://a.com/x.pdf", "Bank Statement")]),
        );
        store.apply_analysis(&a, "old\nlines\nhere").unwrap();
        store.apply_analysis(&a, "Balance: 100\nDate: Jan").unwrap();
        let record = store.get(&a).unwrap();
        assert_eq!(
            record.analysis_lines().unwrap(),
            ["Balance: 100".to_string(), "Date: Jan".to_string()]
        );
        assert_eq!(record.step(), LifecycleStep::AnalysisCompleted);
    }

    #[test]
    fn test_toggle_ignores_untracked_and_in_progress() {
        let mut store = DocumentStore::new();
        assert_eq!(store.toggle_selection(&id("http://a.com/x.pdf")), None);

        let mut response = IdentifyResponse::new();
        response.insert(
            "http://b.com/y.pdf".to_string(),
            IdentifyEntry {
                document_type: Some("Bank Statement".into()),
                step: Some("Downloading PDF".into()),
                ..Default::default()
            },
        );
        store.apply_identification(Operation::CheckStatus, response);
        assert_eq!(store.toggle_selection(&id("http://b.com/y.pdf")), None);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_toggle_does_not_touch_records() {
        let mut store = DocumentStore::new();
        let a = id("http://a.com/x.pdf");
        store.apply_identification(
            Operation::Identify,
            identified(&[("http://a.com/x.pdf", "Bank Statement")]),
        );
        let before = store.get(&a).cloned();
        assert_eq!(store.toggle_selection(&a), Some(true));
        assert_eq!(store.toggle_selection(&a), Some(false));
        assert!(store.selection().is_empty());
        assert_eq!(store.get(&a).cloned(), before);
    }

    #[test]
    fn test_summary_request_uses_selected_analyzed_documents() {
        let mut store = DocumentStore::new();
        store.apply_identification(
            Operation::Identify,
            identified(&[
                ("http://a.com/x.pdf", "Bank Statement"),
                ("http://b.com/y.pdf", "Financial Statement"),
                ("http://c.com/z.pdf", "Bank Statement"),
            ]),
        );
        store.apply_analysis(&id("http://a.com/x.pdf"), "Balance: 100\nDate: Jan").unwrap();
        store.apply_analysis(&id("http://b.com/y.pdf"), "Revenue: 5").unwrap();
        store.select(&id("http://a.com/x.pdf"));
        store.select(&id("http://c.com/z.pdf"));

        let request = store.summary_request();
        assert_eq!(
            request,
            vec![SummaryEntry {
                document_type: "Bank Statement".into(),
                combined_response: "Balance: 100\nDate: Jan".into(),
            }]
        );
    }

    #[test]
    fn test_summaries_keyed_by_type() {
        let mut store = DocumentStore::new();
        store.apply_identification(
            Operation::Identify,
            identified(&[
                ("http://a.com/x.pdf", "This is a Bank Statement."),
                ("http://b.com/y.pdf", "Business Tax Return"),
            ]),
        );
        let mut summaries = SummarizeResponse::new();
        summaries.insert("bank statement".into(), "Average balance: 100".into());
        store.apply_summaries(summaries);

        assert_eq!(store.summaries_by_type()["bank statement"], "Average balance: 100");
        assert_eq!(
            store.get(&id("http://a.com/x.pdf")).unwrap().summary.as_deref(),
            Some("Average balance: 100")
        );
        assert!(store.get(&id("http://b.com/y.pdf")).unwrap().summary.is_none());
    }

    #[test]
    fn test_blank_summaries_dropped() {
        let mut store = DocumentStore::new();
        store.apply_identification(
            Operation::Identify,
            identified(&[("http://a.com/x.pdf", "Bank Statement")]),
        );
        let mut summaries = SummarizeResponse::new();
        summaries.insert("bank statement".into(), "Average balance: 100".into());
        summaries.insert("financial statement".into(), "".into());

        assert_eq!(store.apply_summaries(summaries), 1);
        assert_eq!(store.summaries_by_type().len(), 1);
        assert!(!store.summaries_by_type().contains_key("financial statement"));
    }

    #[test]
    fn test_can_summarize_gating() {
        let mut store = DocumentStore::new();
        assert!(!store.can_summarize());

        store.apply_identification(
            Operation::Identify,
            identified(&[
                ("http://a.com/x.pdf", "Bank Statement"),
                ("http://b.com/y.pdf", "Bank Statement"),
            ]),
        );
        store.apply_analysis(&id("http://a.com/x.pdf"), "Balance: 100").unwrap();
        assert!(!store.can_summarize());
        store.apply_analysis(&id("http://b.com/y.pdf"), "Balance: 200").unwrap();
        assert!(store.can_summarize());
    }
}
