//! Interpretation of raw service responses.
//!
//! Kept apart from the HTTP transport so each status/body combination can be
//! checked without a live service.

use serde_json::Value;

use super::error::ServiceError;
use crate::models::{AnalyzeResponse, IdentifyResponse, SummarizeResponse};

/// Maximum characters of a raw body kept in error messages.
const SNIPPET_CHARS: usize = 500;

/// Truncate text for logging (UTF-8 safe).
pub fn snippet(text: &str) -> &str {
    if text.len() <= SNIPPET_CHARS {
        return text;
    }
    let mut end = SNIPPET_CHARS;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"error": "..."}` and `{"error": {"message": "..."}}`,
/// otherwise falls back to the body itself.
fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("error") {
            Some(Value::String(msg)) => return msg.clone(),
            Some(Value::Object(inner)) => {
                if let Some(Value::String(msg)) = inner.get("message") {
                    return msg.clone();
                }
            }
            _ => {}
        }
    }
    let trimmed = snippet(body).trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}

fn check_status(status: u16, body: &str) -> Result<(), ServiceError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ServiceError::Service {
            status,
            message: error_message(body),
            body: Some(body.to_string()),
        })
    }
}

fn malformed(err: impl std::fmt::Display, body: &str) -> ServiceError {
    ServiceError::Malformed {
        reason: err.to_string(),
        body: body.to_string(),
    }
}

/// Interpret an identification or status-check response.
pub fn parse_identify(status: u16, body: &str) -> Result<IdentifyResponse, ServiceError> {
    check_status(status, body)?;
    serde_json::from_str(body).map_err(|e| malformed(e, body))
}

/// Interpret an analysis response, returning the combined analysis text.
///
/// Success requires `success: true` and a non-empty combined response.
pub fn parse_analyze(status: u16, body: &str) -> Result<String, ServiceError> {
    check_status(status, body)?;
    let response: AnalyzeResponse = serde_json::from_str(body).map_err(|e| malformed(e, body))?;

    match response {
        AnalyzeResponse {
            success: true,
            combined_response: Some(text),
            ..
        } if !text.is_empty() => Ok(text),
        AnalyzeResponse {
            error: Some(message),
            ..
        } => Err(ServiceError::Service {
            status,
            message,
            body: Some(body.to_string()),
        }),
        AnalyzeResponse { success: true, .. } => {
            Err(malformed("success without combined_response", body))
        }
        _ => Err(ServiceError::Service {
            status,
            message: "Unknown error".to_string(),
            body: Some(body.to_string()),
        }),
    }
}

/// Interpret a summarization response.
pub fn parse_summarize(status: u16, body: &str) -> Result<SummarizeResponse, ServiceError> {
    check_status(status, body)?;
    let value: Value = serde_json::from_str(body).map_err(|e| malformed(e, body))?;

    let Value::Object(map) = value else {
        return Err(malformed("expected a JSON object of summaries", body));
    };
    if map.contains_key("error") {
        return Err(ServiceError::Service {
            status,
            message: error_message(body),
            body: Some(body.to_string()),
        });
    }

    map.into_iter()
        .map(|(doc_type, summary)| match summary {
            Value::String(text) => Ok((doc_type, text)),
            other => Err(malformed(
                format!("summary for '{}' is not a string: {}", doc_type, other),
                body,
            )),
        })
        .collect()
}
