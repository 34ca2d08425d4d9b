//! Operation handler trait

use crate::core::translator::{ErrorKind, ServerResponseError};
use crate::core::types::OperationResult;
use crate::rest::param::Argument;

/// Application code behind one binding
///
/// Receives the assembled argument slots, in declaration order, and
/// returns a result or a typed protocol error. Handlers are shared across
/// concurrent requests.
pub trait OperationHandler: Send + Sync {
    fn invoke(&self, args: &[Argument]) -> Result<OperationResult, ServerResponseError>;
}

impl<F> OperationHandler for F
where
    F: Fn(&[Argument]) -> Result<OperationResult, ServerResponseError> + Send + Sync,
{
    fn invoke(&self, args: &[Argument]) -> Result<OperationResult, ServerResponseError> {
        self(args)
    }
}

/// Handler that answers every call with the same error
///
/// Used where bindings are loaded for inspection without application code.
#[derive(Debug, Clone)]
pub struct UnimplementedHandler {
    name: String,
}

impl UnimplementedHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl OperationHandler for UnimplementedHandler {
    fn invoke(&self, _args: &[Argument]) -> Result<OperationResult, ServerResponseError> {
        Err(ServerResponseError::new(
            ErrorKind::Generic(501),
            format!("Operation '{}' is not implemented", self.name),
        ))
    }
}
