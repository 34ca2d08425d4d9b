//! Domain data structures shared by the server and client paths.
//!
//! These are the values that travel through a binding: resource type
//! descriptors, versioned identifiers, and the documents a handler can
//! return (resources, bundles, tag lists, outcome documents).

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::constants::PARAM_HISTORY;

/// Domain types that map to a wire resource name.
///
/// Implemented by application resource structs so that a
/// [`ResourceType`] can be derived without spelling the name twice.
pub trait NamedResource {
    const RESOURCE_NAME: &'static str;
}

/// Resource type descriptor: a domain type's wire name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType {
    name: String,
}

impl ResourceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Descriptor for a type implementing [`NamedResource`]
    pub fn of<T: NamedResource>() -> Self {
        Self::new(T::RESOURCE_NAME)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// HTTP verbs accepted by the binding layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl RequestVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RequestVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("Unsupported HTTP verb: {other}")),
        }
    }
}

/// Resource identifier, optionally carrying a version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdDt {
    id_part: String,
    version: Option<String>,
}

impl IdDt {
    pub fn new(id_part: impl Into<String>) -> Self {
        Self {
            id_part: id_part.into(),
            version: None,
        }
    }

    pub fn with_version(id_part: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id_part: id_part.into(),
            version: Some(version.into()),
        }
    }

    pub fn id_part(&self) -> &str {
        &self.id_part
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    /// Same identifier with the version component dropped
    pub fn without_version(&self) -> Self {
        Self::new(self.id_part.clone())
    }

    /// Extract an identifier from a `Location` or `Content-Location` value
    ///
    /// Accepts relative (`Patient/42/_history/3`) and absolute URLs. The
    /// segment before `_history` is the id; the one after it the version.
    /// Segments are percent-decoded.
    /// Without a `_history` segment the last segment is the id.
    pub fn from_location(location: &str) -> Option<Self> {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();

        match segments.iter().rposition(|s| s == PARAM_HISTORY) {
            Some(pos) if pos > 0 => {
                let id = segments[pos - 1].clone();
                match segments.get(pos + 1) {
                    Some(version) => Some(Self::with_version(id, version.clone())),
                    None => Some(Self::new(id)),
                }
            }
            Some(_) => None,
            None => segments.last().map(|id| Self::new(id.clone())),
        }
    }
}

impl fmt::Display for IdDt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}/{}/{}", self.id_part, PARAM_HISTORY, v),
            None => f.write_str(&self.id_part),
        }
    }
}

/// A single tag (category) attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl Tag {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            label: None,
            scheme: None,
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagList {
    #[serde(rename = "category", default)]
    pub tags: Vec<Tag>,
}

impl TagList {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// A resource document
///
/// The content model is deliberately shallow; concrete resource models
/// live with the application, not the binding layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "versionId", default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            version_id: None,
            text: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Search and history result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(rename = "entry", default)]
    pub entries: Vec<Resource>,
}

impl Bundle {
    pub fn new(entries: Vec<Resource>) -> Self {
        Self {
            total: Some(entries.len() as u64),
            entries,
        }
    }
}

/// Severity of an outcome issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "information",
        }
    }
}

impl FromStr for IssueSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fatal" => Ok(Self::Fatal),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "information" => Ok(Self::Information),
            other => Err(format!("Unknown issue severity: {other}")),
        }
    }
}

// Severity travels as plain text so both codecs see a string element.
impl Serialize for IssueSeverity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IssueSeverity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: IssueSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Structured outcome document, used for error bodies and validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    #[serde(rename = "issue", default)]
    pub issues: Vec<Issue>,
}

impl OperationOutcome {
    /// Outcome carrying a single issue
    pub fn with_issue(severity: IssueSeverity, details: impl Into<String>) -> Self {
        Self {
            issues: vec![Issue {
                severity,
                details: Some(details.into()),
            }],
        }
    }

    /// Details of the first issue, if any
    pub fn first_details(&self) -> Option<&str> {
        self.issues.first().and_then(|i| i.details.as_deref())
    }
}

/// Result of a create or update call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodOutcome {
    pub id: Option<IdDt>,
    pub created: bool,
    pub outcome: Option<OperationOutcome>,
}

impl MethodOutcome {
    pub fn created(id: IdDt) -> Self {
        Self {
            id: Some(id),
            created: true,
            outcome: None,
        }
    }

    pub fn updated(id: IdDt) -> Self {
        Self {
            id: Some(id),
            created: false,
            outcome: None,
        }
    }
}

/// Value produced by a handler on the server, or decoded on the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    Resource(Resource),
    Bundle(Bundle),
    Tags(TagList),
    Outcome(OperationOutcome),
    Method(MethodOutcome),
    Empty,
}
