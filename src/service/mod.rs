//! Remote document service boundary.
//!
//! The service identifies, analyzes and summarizes documents; this crate only
//! sees its responses. [`DocumentService`] is the seam the session drives, with
//! [`HttpDocumentService`] as the production implementation.

mod error;
mod http;
pub mod parse;

pub use error::{FailureKind, ServiceError};
pub use http::HttpDocumentService;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{DocumentId, IdentifyResponse, SummarizeResponse, SummaryEntry};

/// Operations offered by the remote document service.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Identify the document behind a raw URL.
    ///
    /// The response may mention other documents the service knows about,
    /// keyed by their (possibly re-normalized) URL.
    async fn identify(&self, raw_url: &str) -> Result<IdentifyResponse, ServiceError>;

    /// Analyze an identified document, returning the combined analysis text.
    async fn analyze(&self, id: &DocumentId) -> Result<String, ServiceError>;

    /// Summarize analysis output grouped by document type.
    async fn summarize(&self, entries: &[SummaryEntry]) -> Result<SummarizeResponse, ServiceError>;

    /// Fetch the service's view of every document it is tracking.
    async fn check_status(&self) -> Result<IdentifyResponse, ServiceError>;
}

#[async_trait]
impl<T: DocumentService + ?Sized> DocumentService for Arc<T> {
    async fn identify(&self, raw_url: &str) -> Result<IdentifyResponse, ServiceError> {
        (**self).identify(raw_url).await
    }

    async fn analyze(&self, id: &DocumentId) -> Result<String, ServiceError> {
        (**self).analyze(id).await
    }

    async fn summarize(&self, entries: &[SummaryEntry]) -> Result<SummarizeResponse, ServiceError> {
        (**self).summarize(entries).await
    }

    async fn check_status(&self) -> Result<IdentifyResponse, ServiceError> {
        (**self).check_status().await
    }
}
