//! Core domain logic (transport-agnostic)
//!
//! Everything the binding layer needs that does not depend on how a
//! request arrived or where a response goes.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **constants**: Reserved path segments, parameters, headers, statuses
//! - **encoding**: Encoding formats and the parser capability
//! - **error**: Error types and Result alias
//! - **negotiation**: Response encoding selection
//! - **translator**: Status code <-> typed error mapping
//! - **types**: Domain data structures

pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod negotiation;
pub mod translator;
pub mod types;

// Re-export key types for convenience
pub use config::Config;
pub use encoding::{EncodingFormat, Parser, ParserError};
pub use error::{BindError, Result};
pub use negotiation::ContentNegotiator;
pub use translator::{ErrorKind, ErrorTranslator, ServerResponseError};
