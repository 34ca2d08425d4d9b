//! Outgoing client invocations
//!
//! Bindings never assemble URLs themselves; they push path segments,
//! query parameters, headers and a body entity through
//! [`ClientInvocationBuilder`] and hand the result to the transport.

use url::Url;

use crate::core::constants::{HEADER_ACCEPT, HEADER_CONTENT_TYPE, PARAM_PRETTY};
use crate::core::error::{BindError, Result};
use crate::core::types::{RequestVerb, Resource, TagList};
use crate::rest::context::ClientContext;
use crate::rest::request::IncomingRequest;

/// Encoded request body with its declared content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationBody {
    pub content: String,
    pub content_type: String,
}

/// A fully built client call, ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingInvocation {
    verb: RequestVerb,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<InvocationBody>,
}

impl OutgoingInvocation {
    pub fn verb(&self) -> RequestVerb {
        self.verb
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Unencoded path, segments joined by `/`
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&InvocationBody> {
        self.body.as_ref()
    }

    /// Resolve against a server base URL, percent-encoding every segment
    pub fn url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base)
            .map_err(|e| BindError::InvalidArgument(format!("Invalid base URL '{base}': {e}")))?;

        url.path_segments_mut()
            .map_err(|_| BindError::InvalidArgument(format!("'{base}' cannot be a base URL")))?
            .pop_if_empty()
            .extend(self.segments.iter());

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(url)
    }

    /// Encoded request target relative to the server base
    pub fn relative_url(&self) -> Result<String> {
        let url = self.url("http://localhost/")?;
        let path = url.path().trim_start_matches('/');
        Ok(match url.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        })
    }

    /// The server-side request this invocation produces on the wire
    pub fn to_incoming_request(&self) -> Result<IncomingRequest> {
        let mut request = IncomingRequest::parse(self.verb, &self.relative_url()?)?;
        for (name, value) in &self.headers {
            request = request.with_header(name, value.clone());
        }
        if let Some(body) = &self.body {
            request = request
                .with_header(HEADER_CONTENT_TYPE, body.content_type.clone())
                .with_body(body.content.clone());
        }
        Ok(request)
    }
}

/// Builder bindings use to emit an [`OutgoingInvocation`]
#[derive(Debug)]
pub struct ClientInvocationBuilder {
    context: ClientContext,
    verb: RequestVerb,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<InvocationBody>,
}

impl ClientInvocationBuilder {
    pub fn new(verb: RequestVerb, context: ClientContext) -> Self {
        Self {
            context,
            verb,
            segments: Vec::new(),
            query: Vec::new(),
            headers: vec![(
                HEADER_ACCEPT.to_string(),
                context.encoding.content_type().to_string(),
            )],
            body: None,
        }
    }

    pub fn segment(&mut self, segment: impl Into<String>) -> &mut Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Encode a resource as the body entity
    pub fn resource_body(&mut self, resource: &Resource) -> Result<&mut Self> {
        let parser = self.context.encoding.new_parser(false);
        let content = parser.encode_resource_to_string(resource)?;
        self.set_body(content);
        Ok(self)
    }

    /// Encode a tag list as the body entity
    pub fn tag_list_body(&mut self, tags: &TagList) -> Result<&mut Self> {
        let parser = self.context.encoding.new_parser(false);
        let content = parser.encode_tag_list_to_string(tags)?;
        self.set_body(content);
        Ok(self)
    }

    fn set_body(&mut self, content: String) {
        self.body = Some(InvocationBody {
            content,
            content_type: self.context.encoding.content_type().to_string(),
        });
    }

    pub fn build(mut self) -> OutgoingInvocation {
        if self.context.pretty_print {
            self.query.push((PARAM_PRETTY.to_string(), "true".to_string()));
        }

        OutgoingInvocation {
            verb: self.verb,
            segments: self.segments,
            query: self.query,
            headers: self.headers,
            body: self.body,
        }
    }
}
