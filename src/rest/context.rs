//! Per-server and per-client settings handed to bindings at call time

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::core::config::{ClientConfig, ServerConfig};
use crate::core::constants::HEADER_POWERED_BY;
use crate::core::encoding::EncodingFormat;
use crate::core::negotiation::ContentNegotiator;
use crate::rest::response::ResponseSink;

/// Characters escaped in one path segment of a location URL
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Read-only server settings shared by every request
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub negotiator: ContentNegotiator,
    pub pretty_print: bool,
    pub powered_by: String,
    pub base_url: Option<String>,
}

impl ServerContext {
    pub fn new(default_encoding: EncodingFormat) -> Self {
        Self {
            negotiator: ContentNegotiator::new(default_encoding),
            ..Self::from_config(&ServerConfig::default())
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            negotiator: ContentNegotiator::new(config.default_encoding),
            pretty_print: config.pretty_print,
            powered_by: config.powered_by.clone(),
            base_url: config.base_url.clone(),
        }
    }

    pub fn default_encoding(&self) -> EncodingFormat {
        self.negotiator.default_encoding()
    }

    /// Headers every response carries
    pub fn add_headers_to_response(&self, sink: &mut dyn ResponseSink) {
        sink.add_header(HEADER_POWERED_BY, &self.powered_by);
    }

    /// Location URL for a path, absolute when a base URL is configured
    ///
    /// Each segment is percent-encoded on its own, so an id may contain
    /// `/` or spaces.
    pub fn location(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), path),
            None => path,
        }
    }
}

impl Default for ServerContext {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// Client settings applied to every outgoing invocation
#[derive(Debug, Clone, Copy)]
pub struct ClientContext {
    pub encoding: EncodingFormat,
    pub pretty_print: bool,
}

impl ClientContext {
    pub fn new(encoding: EncodingFormat) -> Self {
        Self {
            encoding,
            pretty_print: false,
        }
    }
}

impl From<&ClientConfig> for ClientContext {
    fn from(config: &ClientConfig) -> Self {
        Self {
            encoding: config.encoding,
            pretty_print: config.pretty_print,
        }
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}
