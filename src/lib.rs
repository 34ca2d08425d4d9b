//! fhirbind - REST method binding and dispatch for FHIR-style APIs
//!
//! Binds a declarative description of each API operation (verb,
//! resource type, path shape, parameter roles) to two symmetric
//! behaviours: routing and invoking incoming server requests, and
//! building outgoing client calls and decoding their responses.
//!
//! # Architecture
//!
//! The codebase is organized into three main modules:
//!
//! - **core**: Domain logic (transport-agnostic)
//!   - config, constants, error, types
//!   - encoding (XML/JSON parsers), negotiation
//!   - translator (status code <-> typed error table)
//!
//! - **rest**: Binding layer (depends on core)
//!   - descriptors, dispatch table, parameter bindings
//!   - server façade, client invocations
//!
//! - **cli**: Command-line adapter (depends on core and rest)
//!
//! # Key Features
//!
//! - Hard-equality request matching on verb, keyword, resource, id, version
//! - Typed argument marshalling in both directions
//! - One shared status table for server errors and client decoding
//! - Content negotiation that never fails a request

// Core domain logic (transport-agnostic)
pub mod core;

// Binding layer
pub mod rest;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use crate::core::config::Config;
pub use crate::core::error::{BindError, Result};
pub use crate::core::types::*;
pub use crate::rest::{DispatchTable, OperationBinding, OperationKind, RestServer};
