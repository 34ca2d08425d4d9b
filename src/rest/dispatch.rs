//! Dispatch table for routing requests to bindings

use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::{BindError, Result};
use crate::rest::declaration::{BindingDeclaration, ProviderScope};
use crate::rest::descriptor::OperationBinding;
use crate::rest::handler::OperationHandler;
use crate::rest::request::IncomingRequest;

/// Ordered collection of bindings for one server
///
/// Built once at startup and read concurrently afterwards. Registration
/// order is kept, and `find` returns the first binding that matches.
#[derive(Debug)]
pub struct DispatchTable {
    bindings: Vec<OperationBinding>,
}

impl DispatchTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Build a table from declarations, resolving a handler for each
    pub fn from_declarations<F>(
        declarations: &[BindingDeclaration],
        scope: &ProviderScope,
        mut handler_for: F,
    ) -> Result<Self>
    where
        F: FnMut(&BindingDeclaration) -> Arc<dyn OperationHandler>,
    {
        let mut table = Self::new();
        for declaration in declarations {
            let handler = handler_for(declaration);
            table.register(OperationBinding::from_declaration(
                declaration,
                scope,
                handler,
            )?)?;
        }
        Ok(table)
    }

    /// Register a binding
    ///
    /// Rejects a binding whose name is taken or whose match shape equals
    /// one already registered, since both would answer the same requests.
    pub fn register(&mut self, binding: OperationBinding) -> Result<()> {
        if self.contains(binding.name()) {
            return Err(BindError::Configuration(format!(
                "Method '{}' is already registered",
                binding.name()
            )));
        }

        let shape = binding.match_shape();
        if let Some(existing) = self.bindings.iter().find(|b| b.match_shape() == shape) {
            return Err(BindError::Configuration(format!(
                "Method '{}' matches the same requests as '{}' ({shape})",
                binding.name(),
                existing.name()
            )));
        }

        info!(binding = binding.name(), kind = %binding.kind(), route = %shape, "Registered binding");
        self.bindings.push(binding);
        Ok(())
    }

    /// First binding that matches the request
    pub fn find(&self, request: &IncomingRequest) -> Option<&OperationBinding> {
        let found = self.bindings.iter().find(|b| b.matches(request));
        match found {
            Some(binding) => debug!(
                verb = %request.verb(),
                path = %request.path(),
                binding = binding.name(),
                "Selected binding"
            ),
            None => debug!(verb = %request.verb(), path = %request.path(), "No binding matches"),
        }
        found
    }

    /// Get a binding by name
    pub fn get(&self, name: &str) -> Option<&OperationBinding> {
        self.bindings.iter().find(|b| b.name() == name)
    }

    /// Bindings in registration order
    pub fn bindings(&self) -> impl Iterator<Item = &OperationBinding> {
        self.bindings.iter()
    }

    /// Check if a binding exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get number of registered bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if table is empty
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}
