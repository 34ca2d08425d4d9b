//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific CLI command.

pub mod client_url;
pub mod completions;
pub mod config;
pub mod route;

// Re-export argument types for use in mod.rs
pub use client_url::ClientUrlArgs;
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use route::RouteArgs;

use std::path::Path;
use std::sync::Arc;

use crate::core::error::Result;
use crate::rest::declaration::{BindingFile, ProviderScope};
use crate::rest::dispatch::DispatchTable;
use crate::rest::handler::UnimplementedHandler;

/// Parse a `key=value` argument
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Provider scope selected by `--resource-provider`
pub fn scope_for(resource_provider: Option<&str>) -> ProviderScope {
    resource_provider
        .map(ProviderScope::resource)
        .unwrap_or_default()
}

/// Load a bindings file into a dispatch table backed by stub handlers
pub fn load_table(path: &Path, scope: &ProviderScope) -> Result<(BindingFile, DispatchTable)> {
    let file = BindingFile::from_file(path)?;
    let table = DispatchTable::from_declarations(&file.bindings, scope, |declaration| {
        Arc::new(UnimplementedHandler::new(declaration.name.clone()))
    })?;
    Ok((file, table))
}
