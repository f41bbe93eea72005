//! Diagnostic records for failed service interactions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::service::parse::snippet;
use crate::service::{FailureKind, ServiceError};

/// Which operation a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Identify,
    Analyze,
    Summarize,
    CheckStatus,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Identify => "identify",
            Operation::Analyze => "analyze",
            Operation::Summarize => "summarize",
            Operation::CheckStatus => "check-status",
        };
        f.write_str(name)
    }
}

/// A locally handled failure, kept for operator visibility.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub at: DateTime<Utc>,
    pub operation: Operation,
    /// Identifier the failure concerns, as the caller or service spelled it.
    pub identifier: Option<String>,
    pub kind: FailureKind,
    pub message: String,
    pub raw_response: Option<String>,
}

impl Diagnostic {
    pub fn new(
        operation: Operation,
        identifier: Option<&str>,
        kind: FailureKind,
        message: impl Into<String>,
        raw_response: Option<String>,
    ) -> Self {
        let diagnostic = Self {
            at: Utc::now(),
            operation,
            identifier: identifier.map(str::to_string),
            kind,
            message: message.into(),
            raw_response,
        };
        diagnostic.log();
        diagnostic
    }

    /// Build a diagnostic from a service error.
    pub fn from_error(operation: Operation, identifier: Option<&str>, err: &ServiceError) -> Self {
        Self::new(
            operation,
            identifier,
            err.kind(),
            err.to_string(),
            err.raw_response().map(str::to_string),
        )
    }

    fn log(&self) {
        warn!(
            operation = %self.operation,
            identifier = self.identifier.as_deref().unwrap_or("-"),
            kind = ?self.kind,
            raw_response = self.raw_response.as_deref().map(snippet).unwrap_or(""),
            "{}",
            self.message
        );
    }
}
