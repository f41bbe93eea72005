//! HTTP client for the remote document service.
//!
//! Speaks the Flask-style API: form-encoded `pdf_url` posts for identification
//! and analysis, a JSON `combinedData` post for summarization.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use super::parse::{parse_analyze, parse_identify, parse_summarize};
use super::{DocumentService, ServiceError};
use crate::config::Settings;
use crate::models::{
    DocumentId, IdentifyResponse, SummarizeRequest, SummarizeResponse, SummaryEntry,
};

const IDENTIFY_PATH: &str = "/identify-documents";
const ANALYZE_PATH: &str = "/start-analysis-for-url";
const SUMMARIZE_PATH: &str = "/summarize-all-responses";
const STATUS_PATH: &str = "/check-status";

/// Document service reached over HTTP.
#[derive(Clone)]
pub struct HttpDocumentService {
    client: Client,
    endpoint: String,
}

impl HttpDocumentService {
    /// Create a client from settings.
    pub fn new(settings: &Settings) -> Result<Self, ServiceError> {
        Self::with_options(
            &settings.service_url,
            Duration::from_secs(settings.request_timeout),
            &settings.user_agent,
        )
    }

    /// Create a client for an explicit endpoint.
    pub fn with_options(
        endpoint: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Send a request and return status plus body text.
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<(u16, String), ServiceError> {
        let start = Instant::now();
        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        debug!(
            path,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_bytes = body.len(),
            "service call complete"
        );

        Ok((status, body))
    }
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn identify(&self, raw_url: &str) -> Result<IdentifyResponse, ServiceError> {
        let request = self
            .client
            .post(self.url(IDENTIFY_PATH))
            .form(&[("pdf_url", raw_url)]);
        let (status, body) = self.send(request, IDENTIFY_PATH).await?;
        parse_identify(status, &body)
    }

    async fn analyze(&self, id: &DocumentId) -> Result<String, ServiceError> {
        let request = self
            .client
            .post(self.url(ANALYZE_PATH))
            .form(&[("pdf_url", id.as_str())]);
        let (status, body) = self.send(request, ANALYZE_PATH).await?;
        parse_analyze(status, &body)
    }

    async fn summarize(&self, entries: &[SummaryEntry]) -> Result<SummarizeResponse, ServiceError> {
        let request = self
            .client
            .post(self.url(SUMMARIZE_PATH))
            .json(&SummarizeRequest {
                combined_data: entries,
            });
        let (status, body) = self.send(request, SUMMARIZE_PATH).await?;
        parse_summarize(status, &body)
    }

    async fn check_status(&self) -> Result<IdentifyResponse, ServiceError> {
        let request = self.client.get(self.url(STATUS_PATH));
        let (status, body) = self.send(request, STATUS_PATH).await?;
        parse_identify(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let service =
            HttpDocumentService::with_options("http://127.0.0.1:5000/", Duration::from_secs(5), "t")
                .unwrap();
        assert_eq!(service.endpoint(), "http://127.0.0.1:5000");
        assert_eq!(
            service.url(IDENTIFY_PATH),
            "http://127.0.0.1:5000/identify-documents"
        );
    }

    #[test]
    fn test_new_from_settings() {
        let settings = Settings::default();
        let service = HttpDocumentService::new(&settings).unwrap();
        assert_eq!(service.endpoint(), settings.service_url);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_failure() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let service =
            HttpDocumentService::with_options("http://127.0.0.1:9", Duration::from_secs(2), "t")
                .unwrap();
        let err = service.identify("http://a.com/x.pdf").await.unwrap_err();
        assert_eq!(err.kind(), crate::service::FailureKind::TransportFailure);
    }
}
