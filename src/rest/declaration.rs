//! Declarative binding descriptions
//!
//! Bindings are never discovered by scanning application code. Each one is
//! described explicitly, either in code or in a TOML file of `[[binding]]`
//! tables, and turned into an [`OperationBinding`] at startup:
//!
//! ```toml
//! [[binding]]
//! name = "patient-tags"
//! kind = "get-tags"
//! resource = "Patient"
//! params = [{ role = "id" }]
//!
//! [[binding]]
//! name = "patient-search"
//! kind = "search"
//! resource = "Patient"
//! params = [
//!     { role = "query", name = "family", type = "string", required = true },
//!     { role = "count" },
//! ]
//! ```
//!
//! [`OperationBinding`]: crate::rest::descriptor::OperationBinding

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::Result;
use crate::core::types::ResourceType;
use crate::rest::descriptor::OperationKind;
use crate::rest::param::QueryValueType;

/// Role of one declared handler argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum ParamDeclaration {
    /// Resource id from the request path
    Id,
    /// Version from `_history/<version>`
    Version,
    Query {
        name: String,
        #[serde(rename = "type", default)]
        value_type: QueryValueType,
        #[serde(default)]
        required: bool,
    },
    Header {
        name: String,
    },
    /// Request entity; resource or tag list depending on the operation
    Body,
    /// Shorthand for the `_since` date parameter
    Since,
    /// Shorthand for the `_count` integer parameter
    Count,
}

impl ParamDeclaration {
    pub fn query(name: impl Into<String>, value_type: QueryValueType) -> Self {
        Self::Query {
            name: name.into(),
            value_type,
            required: false,
        }
    }

    pub fn required_query(name: impl Into<String>, value_type: QueryValueType) -> Self {
        Self::Query {
            name: name.into(),
            value_type,
            required: true,
        }
    }

    pub fn header(name: impl Into<String>) -> Self {
        Self::Header { name: name.into() }
    }
}

/// Description of one handler, prior to validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDeclaration {
    pub name: String,
    pub kind: OperationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDeclaration>,
}

impl BindingDeclaration {
    pub fn new(name: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            resource: None,
            params: Vec::new(),
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_param(mut self, param: ParamDeclaration) -> Self {
        self.params.push(param);
        self
    }
}

/// A TOML document of `[[binding]]` tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingFile {
    #[serde(rename = "binding", default)]
    pub bindings: Vec<BindingDeclaration>,
}

impl BindingFile {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Find a declaration by name
    pub fn get(&self, name: &str) -> Option<&BindingDeclaration> {
        self.bindings.iter().find(|b| b.name == name)
    }
}

/// The provider a set of bindings is registered under
///
/// A resource-scoped provider serves exactly one resource type and
/// overrides whatever type its declarations name. A global provider keeps
/// the declared type, which may be absent for system-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderScope {
    Resource(ResourceType),
    #[default]
    Global,
}

impl ProviderScope {
    pub fn resource(name: impl Into<String>) -> Self {
        Self::Resource(ResourceType::new(name))
    }

    /// Resource type a declaration ends up bound to
    pub fn resolve(&self, declared: Option<&str>) -> Option<ResourceType> {
        match self {
            ProviderScope::Resource(resource_type) => Some(resource_type.clone()),
            ProviderScope::Global => declared.map(ResourceType::new),
        }
    }
}
