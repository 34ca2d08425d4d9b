//! Operation binding descriptors
//!
//! An [`OperationBinding`] ties one operation's match rule to both of its
//! invocation paths:
//!
//! - server: `matches` → `invoke_server` (bind arguments, call the
//!   handler, negotiate an encoding, write the result)
//! - client: `invoke_client` (arguments → [`OutgoingInvocation`]) and
//!   `invoke_client_response` (response → typed result or typed error)
//!
//! The operation family is a closed set of [`OperationKind`]s; each kind
//! fixes the verb, keyword, id/version rules, body type and the statuses
//! a client accepts as success. Bindings are validated once at
//! construction and are immutable afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::constants::{
    CHARSET_UTF_8, HEADER_ACCEPT, HEADER_CONTENT_LOCATION, HEADER_LOCATION,
    OPERATION_DELETE_TAGS, PARAM_COUNT, PARAM_FORMAT, PARAM_HISTORY, PARAM_PRETTY, PARAM_SINCE,
    PARAM_TAGS, PARAM_VALIDATE, STATUS_HTTP_200_OK, STATUS_HTTP_201_CREATED,
    STATUS_HTTP_204_NO_CONTENT,
};
use crate::core::encoding::{EncodingFormat, Parser, ParserError};
use crate::core::error::{BindError, Result};
use crate::core::negotiation::pretty_print;
use crate::core::translator::{ErrorTranslator, ServerResponseError};
use crate::core::types::{IdDt, MethodOutcome, OperationResult, RequestVerb, ResourceType};
use crate::rest::context::{ClientContext, ServerContext};
use crate::rest::declaration::{BindingDeclaration, ParamDeclaration, ProviderScope};
use crate::rest::handler::OperationHandler;
use crate::rest::invocation::{ClientInvocationBuilder, OutgoingInvocation};
use crate::rest::param::{
    Argument, HeaderParameter, ParameterBinding, QueryParameter, QueryValueType,
    ResourceBodyParameter, TagListBodyParameter,
};
use crate::rest::request::IncomingRequest;
use crate::rest::response::{ClientResponse, ResponseSink};

/// Supported operation family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Read,
    Create,
    Update,
    Delete,
    Search,
    History,
    GetTags,
    AddTags,
    DeleteTags,
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotRule {
    Required,
    Optional,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyRule {
    None,
    Resource,
    Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultKind {
    Resource,
    Bundle,
    Tags,
    Method,
    OutcomeOrEmpty,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        Self::Read,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Search,
        Self::History,
        Self::GetTags,
        Self::AddTags,
        Self::DeleteTags,
        Self::Validate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::History => "history",
            Self::GetTags => "get-tags",
            Self::AddTags => "add-tags",
            Self::DeleteTags => "delete-tags",
            Self::Validate => "validate",
        }
    }

    pub fn verb(&self) -> RequestVerb {
        match self {
            Self::Read | Self::Search | Self::History | Self::GetTags => RequestVerb::Get,
            Self::Create | Self::AddTags | Self::DeleteTags | Self::Validate => RequestVerb::Post,
            Self::Update => RequestVerb::Put,
            Self::Delete => RequestVerb::Delete,
        }
    }

    /// Operation keyword, `None` for plain CRUD and search
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::History => Some(PARAM_HISTORY),
            Self::GetTags | Self::AddTags => Some(PARAM_TAGS),
            Self::DeleteTags => Some(OPERATION_DELETE_TAGS),
            Self::Validate => Some(PARAM_VALIDATE),
            Self::Read | Self::Create | Self::Update | Self::Delete | Self::Search => None,
        }
    }

    /// Statuses the client path decodes as success
    pub fn success_statuses(&self) -> &'static [u16] {
        match self {
            Self::Read | Self::Search | Self::History | Self::GetTags => &[STATUS_HTTP_200_OK],
            Self::Create => &[STATUS_HTTP_200_OK, STATUS_HTTP_201_CREATED],
            Self::Update => &[
                STATUS_HTTP_200_OK,
                STATUS_HTTP_201_CREATED,
                STATUS_HTTP_204_NO_CONTENT,
            ],
            Self::Delete | Self::AddTags | Self::DeleteTags | Self::Validate => {
                &[STATUS_HTTP_200_OK, STATUS_HTTP_204_NO_CONTENT]
            }
        }
    }

    /// Whether the binding must be bound to a resource type
    pub fn requires_resource_type(&self) -> bool {
        !matches!(self, Self::History | Self::GetTags)
    }

    fn id_rule(&self) -> SlotRule {
        match self {
            Self::Read | Self::Update | Self::Delete | Self::AddTags | Self::DeleteTags => {
                SlotRule::Required
            }
            Self::History | Self::GetTags | Self::Validate => SlotRule::Optional,
            Self::Create | Self::Search => SlotRule::Forbidden,
        }
    }

    fn allows_version(&self) -> bool {
        matches!(
            self,
            Self::Read | Self::GetTags | Self::AddTags | Self::DeleteTags
        )
    }

    fn body_rule(&self) -> BodyRule {
        match self {
            Self::Create | Self::Update | Self::Validate => BodyRule::Resource,
            Self::AddTags | Self::DeleteTags => BodyRule::Tags,
            _ => BodyRule::None,
        }
    }

    fn result_kind(&self) -> ResultKind {
        match self {
            Self::Read => ResultKind::Resource,
            Self::Search | Self::History => ResultKind::Bundle,
            Self::GetTags => ResultKind::Tags,
            Self::Create | Self::Update => ResultKind::Method,
            Self::Delete | Self::AddTags | Self::DeleteTags | Self::Validate => {
                ResultKind::OutcomeOrEmpty
            }
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request shape a binding accepts
///
/// Two bindings with equal shapes would match exactly the same requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchShape {
    pub verb: RequestVerb,
    pub keyword: Option<String>,
    pub resource_name: Option<String>,
    pub has_id: bool,
    pub has_version: bool,
}

impl fmt::Display for MatchShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path: Vec<&str> = Vec::new();
        if let Some(name) = &self.resource_name {
            path.push(name);
        }
        if self.has_id {
            path.push("{id}");
        }
        if self.has_version {
            path.push(PARAM_HISTORY);
            path.push("{version}");
        }
        if let Some(keyword) = &self.keyword {
            path.push(keyword);
        }
        write!(f, "{} /{}", self.verb, path.join("/"))
    }
}

/// A parameter binding and the argument slot it fills
#[derive(Debug)]
pub struct BoundParameter {
    pub index: usize,
    pub binding: Box<dyn ParameterBinding>,
}

/// One operation's match rule plus its server and client invocation logic
pub struct OperationBinding {
    name: String,
    kind: OperationKind,
    resource_type: Option<ResourceType>,
    id_index: Option<usize>,
    version_index: Option<usize>,
    params: Vec<BoundParameter>,
    arity: usize,
    handler: Arc<dyn OperationHandler>,
}

impl fmt::Debug for OperationBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationBinding")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("resource_type", &self.resource_type)
            .field("id_index", &self.id_index)
            .field("version_index", &self.version_index)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl OperationBinding {
    /// Build and validate a binding
    ///
    /// Each declared parameter takes the next argument slot, so slot
    /// indices follow declaration order without gaps. Any declaration the
    /// operation kind cannot honour is a configuration error.
    pub fn new(
        name: impl Into<String>,
        kind: OperationKind,
        resource_type: Option<ResourceType>,
        params: &[ParamDeclaration],
        handler: Arc<dyn OperationHandler>,
    ) -> Result<Self> {
        let name = name.into();
        let config_error = |message: String| -> BindError {
            BindError::Configuration(format!("Method '{name}': {message}"))
        };

        if name.trim().is_empty() {
            return Err(BindError::Configuration(
                "Binding name must not be empty".to_string(),
            ));
        }
        if resource_type.as_ref().is_some_and(|t| t.name().trim().is_empty()) {
            return Err(config_error("resource type name must not be empty".to_string()));
        }

        let mut id_index = None;
        let mut version_index = None;
        let mut has_body = false;
        let mut query_names: HashSet<String> = HashSet::new();
        let mut bound: Vec<BoundParameter> = Vec::new();

        for (index, declaration) in params.iter().enumerate() {
            let binding: Box<dyn ParameterBinding> = match declaration {
                ParamDeclaration::Id => {
                    if id_index.replace(index).is_some() {
                        return Err(config_error("declares more than one id parameter".to_string()));
                    }
                    continue;
                }
                ParamDeclaration::Version => {
                    if version_index.replace(index).is_some() {
                        return Err(config_error(
                            "declares more than one version parameter".to_string(),
                        ));
                    }
                    continue;
                }
                ParamDeclaration::Body => {
                    if has_body {
                        return Err(config_error("declares more than one body parameter".to_string()));
                    }
                    has_body = true;
                    match kind.body_rule() {
                        BodyRule::Resource => Box::new(ResourceBodyParameter),
                        BodyRule::Tags => Box::new(TagListBodyParameter),
                        BodyRule::None => {
                            return Err(config_error(format!(
                                "{kind} operations do not accept a body parameter"
                            )));
                        }
                    }
                }
                ParamDeclaration::Query {
                    name: param_name,
                    value_type,
                    required,
                } => {
                    Self::check_query_name(param_name, &mut query_names).map_err(config_error)?;
                    Box::new(QueryParameter::new(param_name.clone(), *value_type, *required))
                }
                ParamDeclaration::Since => {
                    Self::check_query_name(PARAM_SINCE, &mut query_names).map_err(config_error)?;
                    Box::new(QueryParameter::new(PARAM_SINCE, QueryValueType::Date, false))
                }
                ParamDeclaration::Count => {
                    Self::check_query_name(PARAM_COUNT, &mut query_names).map_err(config_error)?;
                    Box::new(QueryParameter::new(PARAM_COUNT, QueryValueType::Integer, false))
                }
                ParamDeclaration::Header { name: header } => {
                    if header.trim().is_empty() {
                        return Err(config_error("header parameter name must not be empty".to_string()));
                    }
                    Box::new(HeaderParameter::new(header.clone()))
                }
            };
            bound.push(BoundParameter { index, binding });
        }

        if version_index.is_some() && id_index.is_none() {
            return Err(config_error(
                "declares a version parameter without an id parameter".to_string(),
            ));
        }
        if id_index.is_some() && resource_type.is_none() {
            return Err(BindError::Configuration(format!(
                "Method '{name}' does not specify a resource type, but has an id parameter. \
                 Please specify a resource type on the binding or register it with a \
                 resource-scoped provider"
            )));
        }
        if kind.requires_resource_type() && resource_type.is_none() {
            return Err(config_error(format!(
                "{kind} operations require a resource type"
            )));
        }
        match kind.id_rule() {
            SlotRule::Required if id_index.is_none() => {
                return Err(config_error(format!("{kind} operations require an id parameter")));
            }
            SlotRule::Forbidden if id_index.is_some() => {
                return Err(config_error(format!("{kind} operations do not take an id parameter")));
            }
            _ => {}
        }
        if version_index.is_some() && !kind.allows_version() {
            return Err(config_error(format!(
                "{kind} operations do not take a version parameter"
            )));
        }
        if kind.body_rule() != BodyRule::None && !has_body {
            return Err(config_error(format!("{kind} operations require a body parameter")));
        }

        Ok(Self {
            name,
            kind,
            resource_type,
            id_index,
            version_index,
            params: bound,
            arity: params.len(),
            handler,
        })
    }

    fn check_query_name(name: &str, seen: &mut HashSet<String>) -> std::result::Result<(), String> {
        if name.trim().is_empty() {
            return Err("query parameter name must not be empty".to_string());
        }
        if !seen.insert(name.to_string()) {
            return Err(format!("declares query parameter '{name}' more than once"));
        }
        Ok(())
    }

    /// Build a binding from its declarative description
    pub fn from_declaration(
        declaration: &BindingDeclaration,
        scope: &ProviderScope,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<Self> {
        Self::new(
            declaration.name.clone(),
            declaration.kind,
            scope.resolve(declaration.resource.as_deref()),
            &declaration.params,
            handler,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn verb(&self) -> RequestVerb {
        self.kind.verb()
    }

    pub fn keyword(&self) -> Option<&'static str> {
        self.kind.keyword()
    }

    pub fn resource_type(&self) -> Option<&ResourceType> {
        self.resource_type.as_ref()
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.resource_type.as_ref().map(ResourceType::name)
    }

    pub fn id_index(&self) -> Option<usize> {
        self.id_index
    }

    pub fn version_index(&self) -> Option<usize> {
        self.version_index
    }

    /// Number of handler argument slots
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn parameters(&self) -> &[BoundParameter] {
        &self.params
    }

    pub fn match_shape(&self) -> MatchShape {
        MatchShape {
            verb: self.verb(),
            keyword: self.keyword().map(str::to_string),
            resource_name: self.resource_name().map(str::to_string),
            has_id: self.id_index.is_some(),
            has_version: self.version_index.is_some(),
        }
    }

    /// Whether this binding handles the request
    ///
    /// A pure equality check on verb, keyword, resource name, id presence
    /// and version presence. A binding without a resource type only
    /// matches requests without a resource name.
    pub fn matches(&self, request: &IncomingRequest) -> bool {
        request.verb() == self.verb()
            && request.operation() == self.keyword()
            && request.resource_name() == self.resource_name()
            && request.id().is_some() == self.id_index.is_some()
            && request.version_id().is_some() == self.version_index.is_some()
    }

    /// Assemble the handler's argument slots from a request
    pub fn server_arguments(
        &self,
        request: &mut IncomingRequest,
        context: &ServerContext,
    ) -> Result<Vec<Argument>> {
        let mut args = vec![Argument::Absent; self.arity];

        if let Some(index) = self.id_index {
            if let Some(id) = request.id() {
                args[index] = Argument::Id(id.without_version());
            }
        }
        if let Some(index) = self.version_index {
            if let Some(version) = request.version_id() {
                args[index] = Argument::Id(IdDt::new(version));
            }
        }

        for param in &self.params {
            let value = param.binding.bind(request, context)?;
            debug!(
                binding = %self.name,
                index = param.index,
                parameter = %param.binding.describe(),
                value = value.type_name(),
                "Bound argument"
            );
            args[param.index] = value;
        }

        Ok(args)
    }

    /// Serve a matched request
    ///
    /// Handler errors propagate to the caller untranslated; the transport
    /// maps them to a status and outcome body.
    pub fn invoke_server(
        &self,
        request: &mut IncomingRequest,
        context: &ServerContext,
        sink: &mut dyn ResponseSink,
    ) -> Result<()> {
        let args = self.server_arguments(request, context)?;
        let result = self.handler.invoke(&args)?;

        let encoding = context
            .negotiator
            .negotiate(request.param(PARAM_FORMAT), request.header(HEADER_ACCEPT));
        let pretty = pretty_print(request.param(PARAM_PRETTY), context.pretty_print);

        self.write_result(result, encoding, pretty, context, sink)
    }

    fn write_result(
        &self,
        result: OperationResult,
        encoding: EncodingFormat,
        pretty: bool,
        context: &ServerContext,
        sink: &mut dyn ResponseSink,
    ) -> Result<()> {
        let parser = encoding.new_parser(pretty);
        let mut body: Vec<u8> = Vec::new();

        // Encode before the sink is touched, so a failure can still be
        // answered with a clean error response.
        let encoded = match &result {
            OperationResult::Resource(resource) => parser.encode_resource(resource, &mut body),
            OperationResult::Bundle(bundle) => parser.encode_bundle(bundle, &mut body),
            OperationResult::Tags(tags) => parser.encode_tag_list(tags, &mut body),
            OperationResult::Outcome(outcome) => parser.encode_outcome(outcome, &mut body),
            OperationResult::Method(MethodOutcome {
                outcome: Some(outcome),
                ..
            }) => parser.encode_outcome(outcome, &mut body),
            OperationResult::Method(_) | OperationResult::Empty => Ok(()),
        };
        encoded.map_err(|e| self.encode_failure(e))?;

        let mut location_header = None;
        let (status, has_document) = match &result {
            OperationResult::Resource(_)
            | OperationResult::Bundle(_)
            | OperationResult::Tags(_)
            | OperationResult::Outcome(_) => (STATUS_HTTP_200_OK, true),
            OperationResult::Empty => (STATUS_HTTP_204_NO_CONTENT, false),
            OperationResult::Method(method) => {
                let (status, header) = if self.kind == OperationKind::Create || method.created {
                    (STATUS_HTTP_201_CREATED, HEADER_LOCATION)
                } else if method.outcome.is_some() {
                    (STATUS_HTTP_200_OK, HEADER_CONTENT_LOCATION)
                } else {
                    (STATUS_HTTP_204_NO_CONTENT, HEADER_CONTENT_LOCATION)
                };
                location_header = method
                    .id
                    .as_ref()
                    .map(|id| (header, self.location(context, id)));
                (status, method.outcome.is_some())
            }
        };

        sink.set_status(status);
        context.add_headers_to_response(sink);
        if let Some((header, location)) = location_header {
            sink.add_header(header, &location);
        }
        if has_document {
            sink.set_content_type(encoding.content_type());
            sink.set_character_encoding(CHARSET_UTF_8);
            sink.writer().write_all(&body)?;
        }

        sink.writer().flush()?;
        Ok(())
    }

    /// A handler result the negotiated codec cannot express is a server fault
    fn encode_failure(&self, error: ParserError) -> BindError {
        warn!(binding = %self.name, error = %error, "Failed to encode handler result");
        ServerResponseError::internal(format!(
            "Method '{}' returned a result that cannot be encoded: {error}",
            self.name
        ))
        .into()
    }

    fn location(&self, context: &ServerContext, id: &IdDt) -> String {
        let mut segments: Vec<&str> = Vec::new();
        if let Some(name) = self.resource_name() {
            segments.push(name);
        }
        segments.push(id.id_part());
        if let Some(version) = id.version() {
            segments.push(PARAM_HISTORY);
            segments.push(version);
        }
        context.location(&segments)
    }

    /// Build the outgoing call for a set of handler arguments
    ///
    /// `args` is indexed like the server-side argument array. Path
    /// segments are `[resource?, id?, _history, version?, keyword...]`;
    /// the remaining arguments are applied in declaration order.
    pub fn invoke_client(
        &self,
        args: &[Argument],
        context: &ClientContext,
    ) -> Result<OutgoingInvocation> {
        if args.len() != self.arity {
            return Err(BindError::InvalidArgument(format!(
                "Method '{}' takes {} arguments, got {}",
                self.name,
                self.arity,
                args.len()
            )));
        }

        let mut invocation = ClientInvocationBuilder::new(self.verb(), *context);

        if let Some(name) = self.resource_name() {
            invocation.segment(name);
        }
        if let Some(index) = self.id_index {
            invocation.segment(self.path_argument(&args[index], "id")?);
        }
        if let Some(index) = self.version_index {
            invocation.segment(PARAM_HISTORY);
            invocation.segment(self.path_argument(&args[index], "version")?);
        }
        if let Some(keyword) = self.keyword() {
            for part in keyword.split('/') {
                invocation.segment(part);
            }
        }

        for param in &self.params {
            param
                .binding
                .translate_client_argument(&args[param.index], &mut invocation)?;
        }

        Ok(invocation.build())
    }

    fn path_argument(&self, value: &Argument, slot: &str) -> Result<String> {
        let text = match value {
            Argument::Id(id) => id.id_part(),
            Argument::String(s) => s.as_str(),
            other => {
                return Err(BindError::InvalidArgument(format!(
                    "Method '{}' needs a value for its {slot} argument, got {}",
                    self.name,
                    other.type_name()
                )))
            }
        };

        if text.is_empty() {
            return Err(BindError::InvalidArgument(format!(
                "Method '{}' needs a value for its {slot} argument, got an empty one",
                self.name
            )));
        }
        // a leading underscore reads back as an operation keyword
        if text.starts_with('_') {
            return Err(BindError::InvalidArgument(format!(
                "Method '{}': {slot} '{text}' must not start with '_'",
                self.name
            )));
        }
        Ok(text.to_string())
    }

    /// Decode the response to a call built by [`Self::invoke_client`]
    ///
    /// Statuses outside the operation's success set become typed errors
    /// via [`ErrorTranslator`]; nothing partial is returned.
    pub fn invoke_client_response(&self, response: &ClientResponse) -> Result<OperationResult> {
        let status = response.status();
        if !self.kind.success_statuses().contains(&status) {
            let error = ErrorTranslator::translate(status, response.content_type(), response.body());
            debug!(binding = %self.name, status, kind = %error.kind, "Translated error response");
            return Err(error.into());
        }

        let body = response.body();
        match self.kind.result_kind() {
            ResultKind::Resource => Ok(OperationResult::Resource(
                response_parser(response)?.parse_resource(body)?,
            )),
            ResultKind::Bundle => Ok(OperationResult::Bundle(
                response_parser(response)?.parse_bundle(body)?,
            )),
            ResultKind::Tags => Ok(OperationResult::Tags(
                response_parser(response)?.parse_tag_list(body)?,
            )),
            ResultKind::Method => {
                let id = response
                    .header(HEADER_LOCATION)
                    .or_else(|| response.header(HEADER_CONTENT_LOCATION))
                    .and_then(IdDt::from_location);
                let outcome = if body.trim().is_empty() {
                    None
                } else {
                    Some(response_parser(response)?.parse_outcome(body)?)
                };
                Ok(OperationResult::Method(MethodOutcome {
                    id,
                    created: status == STATUS_HTTP_201_CREATED,
                    outcome,
                }))
            }
            ResultKind::OutcomeOrEmpty => {
                if body.trim().is_empty() {
                    Ok(OperationResult::Empty)
                } else {
                    Ok(OperationResult::Outcome(
                        response_parser(response)?.parse_outcome(body)?,
                    ))
                }
            }
        }
    }
}

/// Parser for a response body, chosen by its content type
fn response_parser(response: &ClientResponse) -> std::result::Result<Box<dyn Parser>, ParserError> {
    let content_type = response.content_type().unwrap_or_default();
    EncodingFormat::from_content_type(content_type)
        .map(|format| format.new_parser(false))
        .ok_or_else(|| ParserError::UnsupportedContentType(content_type.to_string()))
}
