//! Document session: drives the status store through the document service.

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::models::{split_url_list, DocumentId, IdentifyResponse};
use crate::service::{DocumentService, FailureKind, ServiceError};
use crate::store::{Diagnostic, DocumentStore, Operation, StoreError};

/// Errors from single-document session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Progress events emitted while a session works.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Identification started for a batch of candidate URLs.
    IdentifyStarted { total: usize },
    /// One identify call returned; `merged` records were created or updated.
    Identified { url: String, merged: usize },
    /// One identify call failed.
    IdentifyFailed {
        url: String,
        kind: FailureKind,
        error: String,
    },
    /// Analysis started for a batch of documents.
    AnalysisStarted { total: usize },
    /// A document's analysis was stored.
    Analyzed { id: DocumentId, lines: usize },
    /// A document's analysis failed; its record is unchanged.
    AnalysisFailed {
        id: DocumentId,
        kind: FailureKind,
        error: String,
    },
    /// Summaries were merged.
    Summarized { types: usize },
    /// Summarization failed.
    SummarizeFailed { kind: FailureKind, error: String },
}

/// Result counts for a batch operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// A user session: one status store plus the service that feeds it.
///
/// Batch operations issue at most `concurrency` calls at a time and apply
/// results to the store in input order, so with the default of 1 each call is
/// awaited before the next starts.
pub struct Session<S> {
    service: S,
    store: DocumentStore,
    concurrency: usize,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl<S: DocumentService> Session<S> {
    /// Start a session with an empty store.
    pub fn new(service: S) -> Self {
        Self {
            service,
            store: DocumentStore::new(),
            concurrency: 1,
            events: None,
        }
    }

    /// Set how many service calls batch operations may have in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Send progress events to the given channel.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// End the session, keeping its final store.
    pub fn into_store(self) -> DocumentStore {
        self.store
    }

    fn emit(&self, event: SessionEvent) {
        emit(self.events.as_ref(), event);
    }

    /// Identify every URL in raw textarea input.
    ///
    /// Input is split on commas and line breaks. Each candidate gets exactly
    /// one identify call; a failure is recorded and the batch carries on.
    /// A call succeeds only if its response identifies the requested URL;
    /// other entries in the response are merged either way.
    pub async fn submit_identification(&mut self, raw_urls: &str) -> BatchOutcome {
        let candidates: Vec<String> = split_url_list(raw_urls)
            .into_iter()
            .map(|raw| match DocumentId::normalize(&raw) {
                Some(id) => id.to_string(),
                None => raw,
            })
            .collect();

        let mut outcome = BatchOutcome {
            attempted: candidates.len(),
            ..Default::default()
        };
        info!(total = candidates.len(), "identifying documents");
        self.emit(SessionEvent::IdentifyStarted {
            total: candidates.len(),
        });

        let service = &self.service;
        let mut results = stream::iter(candidates)
            .map(|url| async move {
                let result = service.identify(&url).await;
                (url, result)
            })
            .buffered(self.concurrency);

        while let Some((url, result)) = results.next().await {
            match result {
                Ok(response) => {
                    let requested = DocumentId::normalize(&url);
                    let rejection = requested_rejection(&response, requested.as_ref());
                    let merged = self.store.apply_identification(Operation::Identify, response);

                    if requested.is_some_and(|id| merged.contains(&id)) {
                        outcome.succeeded += 1;
                        self.emit(SessionEvent::Identified {
                            url,
                            merged: merged.len(),
                        });
                        continue;
                    }

                    outcome.failed += 1;
                    warn!(url = %url, "identify response did not identify the requested document");
                    if let Rejection::Missing { raw_response } = &rejection {
                        self.store.push_diagnostic(Diagnostic::new(
                            Operation::Identify,
                            Some(&url),
                            FailureKind::MalformedResponse,
                            rejection.message(),
                            raw_response.clone(),
                        ));
                    }
                    self.emit(SessionEvent::IdentifyFailed {
                        url,
                        kind: rejection.kind(),
                        error: rejection.message(),
                    });
                }
                Err(err) => {
                    outcome.failed += 1;
                    self.store
                        .record_failure(Operation::Identify, Some(&url), &err);
                    self.emit(SessionEvent::IdentifyFailed {
                        url,
                        kind: err.kind(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "identification finished"
        );
        outcome
    }

    /// Analyze one tracked document, replacing any earlier analysis.
    ///
    /// On failure the record keeps its previous state.
    pub async fn start_analysis(&mut self, id: &DocumentId) -> Result<(), SessionError> {
        if !self.store.contains(id) {
            return Err(StoreError::UnknownDocument(id.clone()).into());
        }

        let result = self.service.analyze(id).await;
        apply_analysis_result(&mut self.store, self.events.as_ref(), id, result)
    }

    /// Analyze every tracked document; failures do not stop the batch.
    pub async fn analyze_all(&mut self) -> BatchOutcome {
        let ids: Vec<DocumentId> = self.store.ids().to_vec();
        let mut outcome = BatchOutcome {
            attempted: ids.len(),
            ..Default::default()
        };
        info!(total = ids.len(), "analyzing documents");
        self.emit(SessionEvent::AnalysisStarted { total: ids.len() });

        let service = &self.service;
        let mut results = stream::iter(ids)
            .map(|id| async move {
                let result = service.analyze(&id).await;
                (id, result)
            })
            .buffered(self.concurrency);

        while let Some((id, result)) = results.next().await {
            match apply_analysis_result(&mut self.store, self.events.as_ref(), &id, result) {
                Ok(()) => outcome.succeeded += 1,
                Err(err) => {
                    outcome.failed += 1;
                    debug!(id = %id, error = %err, "analysis failed");
                }
            }
        }

        info!(
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "analysis finished"
        );
        outcome
    }

    /// Flip whether a document is selected for summarization.
    pub fn toggle_selection(&mut self, id: &DocumentId) -> Option<bool> {
        self.store.toggle_selection(id)
    }

    /// Select a document; false when it is not tracked or not identified.
    pub fn select(&mut self, id: &DocumentId) -> bool {
        self.store.select(id)
    }

    /// Select every identified document.
    pub fn select_all(&mut self) -> usize {
        self.store.select_all()
    }

    /// Whether every tracked document is analyzed.
    pub fn can_summarize(&self) -> bool {
        self.store.can_summarize()
    }

    /// Summarize the selected documents and merge the summaries by type.
    pub async fn summarize_selected(
        &mut self,
    ) -> Result<&BTreeMap<String, String>, SessionError> {
        let entries = self.store.summary_request();
        if entries.is_empty() {
            return Err(StoreError::NothingToSummarize.into());
        }

        info!(documents = entries.len(), "summarizing selected documents");
        match self.service.summarize(&entries).await {
            Ok(summaries) => {
                let types = self.store.apply_summaries(summaries);
                self.emit(SessionEvent::Summarized { types });
                Ok(self.store.summaries_by_type())
            }
            Err(err) => {
                self.store.record_failure(Operation::Summarize, None, &err);
                self.emit(SessionEvent::SummarizeFailed {
                    kind: err.kind(),
                    error: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Merge the service's status view into the store.
    ///
    /// Returns how many records were created or updated.
    pub async fn refresh_status(&mut self) -> Result<usize, SessionError> {
        match self.service.check_status().await {
            Ok(response) => {
                let merged = self
                    .store
                    .apply_identification(Operation::CheckStatus, response);
                Ok(merged.len())
            }
            Err(err) => {
                self.store.record_failure(Operation::CheckStatus, None, &err);
                Err(err.into())
            }
        }
    }
}

/// Why an identify response did not identify the requested document.
enum Rejection {
    /// The service reported an error for it.
    Error(String),
    /// It was listed without a document type.
    Untyped,
    /// It was not listed at all.
    Missing { raw_response: Option<String> },
}

impl Rejection {
    fn kind(&self) -> FailureKind {
        match self {
            Rejection::Error(_) => FailureKind::ServiceFailure,
            Rejection::Untyped | Rejection::Missing { .. } => FailureKind::MalformedResponse,
        }
    }

    fn message(&self) -> String {
        match self {
            Rejection::Error(message) => message.clone(),
            Rejection::Untyped => "Response entry has no document_type".to_string(),
            Rejection::Missing { .. } => {
                "Response does not mention the requested document".to_string()
            }
        }
    }
}

/// Classify the requested document's entry before the response is merged.
fn requested_rejection(response: &IdentifyResponse, requested: Option<&DocumentId>) -> Rejection {
    let entry = requested.and_then(|id| {
        response
            .iter()
            .find(|(key, _)| DocumentId::normalize(key).as_ref() == Some(id))
            .map(|(_, entry)| entry)
    });

    match entry {
        Some(entry) => match &entry.error {
            Some(message) => Rejection::Error(message.clone()),
            None => Rejection::Untyped,
        },
        None => Rejection::Missing {
            raw_response: serde_json::to_string(response).ok(),
        },
    }
}

fn emit(events: Option<&mpsc::UnboundedSender<SessionEvent>>, event: SessionEvent) {
    if let Some(tx) = events {
        // Receiver may have gone away; progress is best-effort.
        let _ = tx.send(event);
    }
}

fn apply_analysis_result(
    store: &mut DocumentStore,
    events: Option<&mpsc::UnboundedSender<SessionEvent>>,
    id: &DocumentId,
    result: Result<String, ServiceError>,
) -> Result<(), SessionError> {
    match result {
        Ok(text) => {
            store.apply_analysis(id, &text)?;
            let lines = store
                .get(id)
                .and_then(|r| r.analysis_lines())
                .map_or(0, <[String]>::len);
            emit(
                events,
                SessionEvent::Analyzed {
                    id: id.clone(),
                    lines,
                },
            );
            Ok(())
        }
        Err(err) => {
            store.record_failure(Operation::Analyze, Some(id.as_str()), &err);
            emit(
                events,
                SessionEvent::AnalysisFailed {
                    id: id.clone(),
                    kind: err.kind(),
                    error: err.to_string(),
                },
            );
            Err(err.into())
        }
    }
}
