//! Incoming request model
//!
//! A transport hands the binding layer a pre-parsed request: verb, the
//! resource/id/version/operation split of the path, headers, query
//! parameters and a lazily read body.

use percent_encoding::percent_decode_str;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use url::form_urlencoded;

use crate::core::constants::{HEADER_CONTENT_TYPE, PARAM_HISTORY};
use crate::core::error::Result;
use crate::core::translator::ServerResponseError;
use crate::core::types::{IdDt, RequestVerb};

enum RequestBody {
    Empty,
    Pending(Box<dyn Read + Send>),
    Consumed(String),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Pending(_) => f.write_str("Pending"),
            RequestBody::Consumed(body) => write!(f, "Consumed({} bytes)", body.len()),
        }
    }
}

/// One server request, created per call
#[derive(Debug)]
pub struct IncomingRequest {
    verb: RequestVerb,
    resource_name: Option<String>,
    operation: Option<String>,
    id: Option<IdDt>,
    headers: BTreeMap<String, Vec<String>>,
    params: BTreeMap<String, Vec<String>>,
    body: RequestBody,
}

impl IncomingRequest {
    pub fn new(verb: RequestVerb) -> Self {
        Self {
            verb,
            resource_name: None,
            operation: None,
            id: None,
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Split a relative request target into its binding-relevant parts
    ///
    /// `Patient/42/_history/5/_tags?_format=xml` yields resource `Patient`,
    /// id `42` version `5`, operation `_tags` and one query parameter.
    /// Underscore segments are operations; a non-underscore segment after
    /// `_history` is a version. Trailing operation segments are joined with
    /// `/` (`_tags/_delete`).
    pub fn parse(verb: RequestVerb, target: &str) -> Result<Self> {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));

        let mut segments = Vec::new();
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            let decoded = percent_decode_str(raw).decode_utf8().map_err(|e| {
                ServerResponseError::invalid_request(format!("Invalid path segment '{raw}': {e}"))
            })?;
            segments.push(decoded.into_owned());
        }

        let mut request = Self::new(verb);
        let mut rest = segments.into_iter().peekable();

        if rest.peek().is_some_and(|s| !s.starts_with('_')) {
            request.resource_name = rest.next();

            if rest.peek().is_some_and(|s| !s.starts_with('_')) {
                request.id = rest.next().map(IdDt::new);
            }
        }

        let mut operation: Vec<String> = Vec::new();

        if request.id.is_some() && rest.peek().is_some_and(|s| s == PARAM_HISTORY) {
            rest.next();
            match rest.next_if(|s| !s.starts_with('_')) {
                Some(version) => {
                    request.id = request
                        .id
                        .take()
                        .map(|id| IdDt::with_version(id.id_part(), version));
                }
                None => operation.push(PARAM_HISTORY.to_string()),
            }
        }

        for segment in rest {
            if !segment.starts_with('_') {
                return Err(ServerResponseError::invalid_request(format!(
                    "Unexpected path segment '{segment}' in '{path}'"
                ))
                .into());
            }
            operation.push(segment);
        }

        if !operation.is_empty() {
            request.operation = Some(operation.join("/"));
        }

        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            request
                .params
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }

        Ok(request)
    }

    pub fn with_resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_id(mut self, id: IdDt) -> Self {
        self.id = Some(id);
        self
    }

    /// Add a header value; names are case-insensitive
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Consumed(body.into());
        self
    }

    /// Attach a body that is read on first use
    pub fn with_body_reader(mut self, reader: impl Read + Send + 'static) -> Self {
        self.body = RequestBody::Pending(Box::new(reader));
        self
    }

    pub fn verb(&self) -> RequestVerb {
        self.verb
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }

    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    pub fn id(&self) -> Option<&IdDt> {
        self.id.as_ref()
    }

    pub fn version_id(&self) -> Option<&str> {
        self.id.as_ref().and_then(IdDt::version)
    }

    /// First value of a header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// First value of a query parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params(name).first().map(String::as_str)
    }

    /// All values of a query parameter, in request order
    pub fn params(&self, name: &str) -> &[String] {
        self.params.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(HEADER_CONTENT_TYPE)
    }

    /// Body text, reading the underlying stream on first call
    ///
    /// Read failures (including a dropped connection) surface as I/O
    /// errors; the stream is never retried.
    pub fn read_body(&mut self) -> std::io::Result<&str> {
        if let RequestBody::Pending(reader) = &mut self.body {
            let mut body = String::new();
            reader.read_to_string(&mut body)?;
            self.body = RequestBody::Consumed(body);
        }

        match &self.body {
            RequestBody::Consumed(body) => Ok(body),
            _ => Ok(""),
        }
    }

    /// Path form of the request, for logging
    pub fn path(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(name) = &self.resource_name {
            parts.push(name.clone());
        }
        if let Some(id) = &self.id {
            parts.push(id.to_string());
        }
        if let Some(op) = &self.operation {
            parts.push(op.clone());
        }
        parts.join("/")
    }
}
