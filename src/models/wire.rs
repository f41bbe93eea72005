//! Payload types exchanged with the remote document service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of an identification (or status) response.
///
/// The service reports every document it knows about keyed by URL, and an
/// entry may be partial while work is still in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Identification response: raw identifier to entry.
pub type IdentifyResponse = BTreeMap<String, IdentifyEntry>;

/// Analysis response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "analysis")]
    pub combined_response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One document's contribution to a summarization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub document_type: String,
    pub combined_response: String,
}

/// Summarization request body.
#[derive(Debug, Clone, Serialize)]
pub struct SummarizeRequest<'a> {
    #[serde(rename = "combinedData")]
    pub combined_data: &'a [SummaryEntry],
}

/// Summarization response: document type label to summary text.
pub type SummarizeResponse = BTreeMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_entry_partial_fields() {
        let body = r#"{
            "https://a.com/x.pdf": {"document_type": "Bank Statement", "step": "Identification Completed"},
            "https://b.com/y.pdf": {"step": "Downloading PDF", "error": "timeout"}
        }"#;
        let response: IdentifyResponse = serde_json::from_str(body).unwrap();
        let a = &response["https://a.com/x.pdf"];
        assert_eq!(a.document_type.as_deref(), Some("Bank Statement"));
        assert!(a.optimized_text.is_none());
        let b = &response["https://b.com/y.pdf"];
        assert!(b.document_type.is_none());
        assert_eq!(b.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_analyze_response_accepts_analysis_alias() {
        let body = r#"{"success": true, "analysis": "Balance: 100"}"#;
        let response: AnalyzeResponse = serde_json::from_str(body).unwrap();
        assert!(response.success);
        assert_eq!(response.combined_response.as_deref(), Some("Balance: 100"));
    }

    #[test]
    fn test_summarize_request_shape() {
        let entries = vec![SummaryEntry {
            document_type: "Bank Statement".to_string(),
            combined_response: "Balance: 100".to_string(),
        }];
        let json = serde_json::to_value(SummarizeRequest {
            combined_data: &entries,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "combinedData": [
                    {"document_type": "Bank Statement", "combined_response": "Balance: 100"}
                ]
            })
        );
    }
}
