//! Shared mapping between HTTP status codes and typed protocol errors.
//!
//! The same table is read in both directions: the client decode path maps a
//! non-success status to an [`ErrorKind`], and the server maps a handler's
//! [`ServerResponseError`] back to its status.

use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::core::encoding::EncodingFormat;
use crate::core::types::{IssueSeverity, OperationOutcome};

/// Typed error taxonomy for non-success responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    Unauthorized,
    ResourceNotFound,
    Conflict,
    Gone,
    UnprocessableEntity,
    /// Any status without a dedicated kind
    Generic(u16),
}

const STATUS_TABLE: &[(u16, ErrorKind)] = &[
    (400, ErrorKind::InvalidRequest),
    (401, ErrorKind::Unauthorized),
    (404, ErrorKind::ResourceNotFound),
    (409, ErrorKind::Conflict),
    (410, ErrorKind::Gone),
    (422, ErrorKind::UnprocessableEntity),
];

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        STATUS_TABLE
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::Generic(status))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Generic(status) => *status,
            kind => STATUS_TABLE
                .iter()
                .find(|(_, k)| k == kind)
                .map(|(code, _)| *code)
                .unwrap_or(500),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidRequest => f.write_str("Invalid request"),
            ErrorKind::Unauthorized => f.write_str("Unauthorized"),
            ErrorKind::ResourceNotFound => f.write_str("Resource not found"),
            ErrorKind::Conflict => f.write_str("Conflict"),
            ErrorKind::Gone => f.write_str("Resource gone"),
            ErrorKind::UnprocessableEntity => f.write_str("Unprocessable entity"),
            ErrorKind::Generic(status) => write!(f, "Server error (HTTP {status})"),
        }
    }
}

/// A protocol-level error with its status and optional outcome document
///
/// Handlers return this to produce a non-success response; the client
/// decode path produces it from a non-success response.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ServerResponseError {
    pub kind: ErrorKind,
    pub status: u16,
    pub message: String,
    pub outcome: Option<OperationOutcome>,
    pub raw_body: Option<String>,
}

impl ServerResponseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: kind.status_code(),
            kind,
            message: message.into(),
            outcome: None,
            raw_body: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceNotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generic(500), message)
    }

    pub fn with_outcome(mut self, outcome: OperationOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Outcome document to send for this error
    ///
    /// Falls back to a single-issue outcome built from the message.
    pub fn to_outcome(&self) -> OperationOutcome {
        self.outcome
            .clone()
            .unwrap_or_else(|| OperationOutcome::with_issue(IssueSeverity::Error, &self.message))
    }
}

/// Translates non-success responses into [`ServerResponseError`]s
pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Build the typed error for a non-success response
    ///
    /// The body is decoded as an outcome document when the content type
    /// names a known encoding. When it can't be decoded the raw text is
    /// kept and the kind comes from the status alone.
    pub fn translate(status: u16, content_type: Option<&str>, body: &str) -> ServerResponseError {
        let kind = ErrorKind::from_status(status);

        let outcome = content_type
            .and_then(EncodingFormat::from_content_type)
            .filter(|_| !body.trim().is_empty())
            .and_then(|format| match format.new_parser(false).parse_outcome(body) {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    debug!(status, error = %e, "Error body is not an outcome document");
                    None
                }
            });

        let message = match outcome.as_ref().and_then(|o| o.first_details()) {
            Some(details) => details.to_string(),
            None if body.trim().is_empty() => format!("HTTP {status}"),
            None => format!("HTTP {status}: {}", body.trim()),
        };

        let raw_body = match outcome {
            Some(_) => None,
            None if body.is_empty() => None,
            None => Some(body.to_string()),
        };

        ServerResponseError {
            kind,
            status,
            message,
            outcome,
            raw_body,
        }
    }
}
