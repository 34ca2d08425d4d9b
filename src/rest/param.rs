//! Parameter bindings
//!
//! A [`ParameterBinding`] owns one declared argument slot and moves its
//! value between wire form and [`Argument`] in both directions: `bind`
//! extracts it from an incoming request, `translate_client_argument`
//! writes it onto an outgoing invocation. The two are inverses.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::core::encoding::EncodingFormat;
use crate::core::error::{BindError, Result};
use crate::core::translator::ServerResponseError;
use crate::core::types::{IdDt, Resource, TagList};
use crate::rest::context::ServerContext;
use crate::rest::invocation::ClientInvocationBuilder;
use crate::rest::request::IncomingRequest;

/// Typed value of one argument slot
///
/// An empty `Strings` list has no wire form: it is sent as nothing and
/// comes back from the server as `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Absent,
    Id(IdDt),
    String(String),
    Strings(Vec<String>),
    Integer(i64),
    Date(DateTime<Utc>),
    Resource(Resource),
    Tags(TagList),
}

impl Argument {
    pub fn type_name(&self) -> &'static str {
        match self {
            Argument::Absent => "absent",
            Argument::Id(_) => "id",
            Argument::String(_) => "string",
            Argument::Strings(_) => "strings",
            Argument::Integer(_) => "integer",
            Argument::Date(_) => "date",
            Argument::Resource(_) => "resource",
            Argument::Tags(_) => "tag list",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Argument::Absent)
    }

    pub fn as_id(&self) -> Option<&IdDt> {
        match self {
            Argument::Id(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Argument::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Argument::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&TagList> {
        match self {
            Argument::Tags(t) => Some(t),
            _ => None,
        }
    }
}

/// One declared argument slot, in both directions
pub trait ParameterBinding: Send + Sync + fmt::Debug {
    /// Short description for logs and error messages
    fn describe(&self) -> String;

    /// Extract the slot value from a server request
    fn bind(&self, request: &mut IncomingRequest, context: &ServerContext) -> Result<Argument>;

    /// Write a client argument onto the invocation being built
    fn translate_client_argument(
        &self,
        value: &Argument,
        invocation: &mut ClientInvocationBuilder,
    ) -> Result<()>;
}

fn wrong_type(binding: &dyn ParameterBinding, expected: &str, value: &Argument) -> BindError {
    BindError::InvalidArgument(format!(
        "{} expects {expected}, got {}",
        binding.describe(),
        value.type_name()
    ))
}

/// Value type of a query parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryValueType {
    #[default]
    String,
    Strings,
    Integer,
    Date,
}

/// Named query parameter
#[derive(Debug, Clone)]
pub struct QueryParameter {
    name: String,
    value_type: QueryValueType,
    required: bool,
}

impl QueryParameter {
    pub fn new(name: impl Into<String>, value_type: QueryValueType, required: bool) -> Self {
        Self {
            name: name.into(),
            value_type,
            required,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn missing(&self) -> Result<Argument> {
        if self.required {
            return Err(ServerResponseError::invalid_request(format!(
                "Missing required parameter '{}'",
                self.name
            ))
            .into());
        }
        Ok(Argument::Absent)
    }

    fn invalid(&self, expected: &str, value: &str) -> BindError {
        ServerResponseError::invalid_request(format!(
            "Parameter '{}' must be {expected}, got '{value}'",
            self.name
        ))
        .into()
    }
}

impl ParameterBinding for QueryParameter {
    fn describe(&self) -> String {
        format!("query parameter '{}'", self.name)
    }

    fn bind(&self, request: &mut IncomingRequest, _context: &ServerContext) -> Result<Argument> {
        let values = request.params(&self.name);
        let Some(first) = values.first() else {
            return self.missing();
        };

        match self.value_type {
            QueryValueType::String => Ok(Argument::String(first.clone())),
            QueryValueType::Strings => Ok(Argument::Strings(values.to_vec())),
            QueryValueType::Integer => first
                .trim()
                .parse::<i64>()
                .map(Argument::Integer)
                .map_err(|_| self.invalid("an integer", first)),
            QueryValueType::Date => DateTime::parse_from_rfc3339(first.trim())
                .map(|d| Argument::Date(d.with_timezone(&Utc)))
                .map_err(|_| self.invalid("an RFC 3339 instant", first)),
        }
    }

    fn translate_client_argument(
        &self,
        value: &Argument,
        invocation: &mut ClientInvocationBuilder,
    ) -> Result<()> {
        match (self.value_type, value) {
            (_, Argument::Absent) if self.required => Err(BindError::InvalidArgument(format!(
                "{} is required",
                self.describe()
            ))),
            (_, Argument::Absent) => Ok(()),
            // an empty list sends nothing, so the server sees it as absent
            (QueryValueType::Strings, Argument::Strings(values))
                if values.is_empty() && self.required =>
            {
                Err(BindError::InvalidArgument(format!(
                    "{} is required, got an empty list",
                    self.describe()
                )))
            }
            (QueryValueType::String, Argument::String(s)) => {
                invocation.query_param(&self.name, s);
                Ok(())
            }
            (QueryValueType::Strings, Argument::Strings(values)) => {
                for v in values {
                    invocation.query_param(&self.name, v);
                }
                Ok(())
            }
            (QueryValueType::Integer, Argument::Integer(i)) => {
                invocation.query_param(&self.name, i.to_string());
                Ok(())
            }
            (QueryValueType::Date, Argument::Date(d)) => {
                invocation.query_param(&self.name, d.to_rfc3339_opts(SecondsFormat::AutoSi, true));
                Ok(())
            }
            (expected, other) => Err(wrong_type(self, &format!("{expected:?}").to_lowercase(), other)),
        }
    }
}

/// Request header carried as a string argument
#[derive(Debug, Clone)]
pub struct HeaderParameter {
    name: String,
}

impl HeaderParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ParameterBinding for HeaderParameter {
    fn describe(&self) -> String {
        format!("header '{}'", self.name)
    }

    fn bind(&self, request: &mut IncomingRequest, _context: &ServerContext) -> Result<Argument> {
        Ok(request
            .header(&self.name)
            .map(|v| Argument::String(v.to_string()))
            .unwrap_or(Argument::Absent))
    }

    fn translate_client_argument(
        &self,
        value: &Argument,
        invocation: &mut ClientInvocationBuilder,
    ) -> Result<()> {
        match value {
            Argument::Absent => Ok(()),
            Argument::String(s) => {
                invocation.header(&self.name, s);
                Ok(())
            }
            other => Err(wrong_type(self, "a string", other)),
        }
    }
}

/// Read the request body and pick its codec
///
/// The codec follows the request `Content-Type`, falling back to the
/// server default encoding.
fn read_request_body(request: &mut IncomingRequest, context: &ServerContext) -> Result<(EncodingFormat, String)> {
    let encoding = request
        .content_type()
        .and_then(EncodingFormat::from_content_type)
        .unwrap_or_else(|| context.default_encoding());

    let body = request.read_body()?;
    if body.trim().is_empty() {
        return Err(ServerResponseError::invalid_request("Request body is empty").into());
    }

    debug!(encoding = %encoding, bytes = body.len(), "Read request body");
    Ok((encoding, body.to_string()))
}

fn unparseable(e: impl fmt::Display) -> BindError {
    ServerResponseError::invalid_request(format!("Unable to parse request body: {e}")).into()
}

/// Resource carried in the request body
#[derive(Debug, Clone, Default)]
pub struct ResourceBodyParameter;

impl ParameterBinding for ResourceBodyParameter {
    fn describe(&self) -> String {
        "resource body".to_string()
    }

    fn bind(&self, request: &mut IncomingRequest, context: &ServerContext) -> Result<Argument> {
        let (encoding, body) = read_request_body(request, context)?;
        let resource = encoding
            .new_parser(false)
            .parse_resource(&body)
            .map_err(unparseable)?;
        Ok(Argument::Resource(resource))
    }

    fn translate_client_argument(
        &self,
        value: &Argument,
        invocation: &mut ClientInvocationBuilder,
    ) -> Result<()> {
        match value {
            Argument::Resource(resource) => {
                invocation.resource_body(resource)?;
                Ok(())
            }
            other => Err(wrong_type(self, "a resource", other)),
        }
    }
}

/// Tag list carried in the request body
#[derive(Debug, Clone, Default)]
pub struct TagListBodyParameter;

impl ParameterBinding for TagListBodyParameter {
    fn describe(&self) -> String {
        "tag list body".to_string()
    }

    fn bind(&self, request: &mut IncomingRequest, context: &ServerContext) -> Result<Argument> {
        let (encoding, body) = read_request_body(request, context)?;
        let tags = encoding
            .new_parser(false)
            .parse_tag_list(&body)
            .map_err(unparseable)?;
        Ok(Argument::Tags(tags))
    }

    fn translate_client_argument(
        &self,
        value: &Argument,
        invocation: &mut ClientInvocationBuilder,
    ) -> Result<()> {
        match value {
            Argument::Tags(tags) => {
                invocation.tag_list_body(tags)?;
                Ok(())
            }
            other => Err(wrong_type(self, "a tag list", other)),
        }
    }
}
