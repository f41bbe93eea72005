//! Failure taxonomy for remote document service calls.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur talking to the document service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a response (connect, TLS, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status or an explicit error.
    #[error("Service error (HTTP {status}): {message}")]
    Service {
        status: u16,
        message: String,
        body: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {reason}")]
    Malformed { reason: String, body: String },
}

/// Coarse failure classification recorded in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    TransportFailure,
    ServiceFailure,
    MalformedResponse,
}

impl ServiceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ServiceError::Transport(_) => FailureKind::TransportFailure,
            ServiceError::Service { .. } => FailureKind::ServiceFailure,
            ServiceError::Malformed { .. } => FailureKind::MalformedResponse,
        }
    }

    /// Raw response body, when one was received.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ServiceError::Transport(_) => None,
            ServiceError::Service { body, .. } => body.as_deref(),
            ServiceError::Malformed { body, .. } => Some(body),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_raw_response() {
        let err = ServiceError::Transport("connection refused".into());
        assert_eq!(err.kind(), FailureKind::TransportFailure);
        assert!(err.raw_response().is_none());

        let err = ServiceError::Service {
            status: 400,
            message: "Invalid PDF URL".into(),
            body: Some(r#"{"error":"Invalid PDF URL"}"#.into()),
        };
        assert_eq!(err.kind(), FailureKind::ServiceFailure);
        assert_eq!(err.to_string(), "Service error (HTTP 400): Invalid PDF URL");

        let err = ServiceError::Malformed {
            reason: "expected value".into(),
            body: "<html>".into(),
        };
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
        assert_eq!(err.raw_response(), Some("<html>"));
    }
}
