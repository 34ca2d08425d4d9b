//! Error types and error handling for the binding layer.
//!
//! `BindError` covers everything that can go wrong while building
//! bindings, serving a request or decoding a client response. Typed
//! protocol errors travel inside the `Server` variant.

use thiserror::Error;

use crate::core::constants::STATUS_HTTP_500_INTERNAL_ERROR;
use crate::core::encoding::ParserError;
use crate::core::translator::{ErrorKind, ServerResponseError};

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, BindError>;

/// Main error type for the binding layer
#[derive(Error, Debug)]
pub enum BindError {
    /// Invalid binding declaration, raised at construction time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Client argument of the wrong shape or arity
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Server(#[from] ServerResponseError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParserError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BindError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status a transport should answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            BindError::Server(e) => e.status,
            BindError::Parse(_) => ErrorKind::InvalidRequest.status_code(),
            BindError::Configuration(_)
            | BindError::InvalidArgument(_)
            | BindError::Io(_)
            | BindError::Toml(_) => STATUS_HTTP_500_INTERNAL_ERROR,
        }
    }

    /// Typed error kind, when this is a protocol error
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            BindError::Server(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, BindError::Configuration(_))
    }
}
