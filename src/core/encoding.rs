//! Wire encodings and the parser capability.
//!
//! An [`EncodingFormat`] names a serialization and its MIME type. Parsers
//! are created per call through [`EncodingFormat::new_parser`]; no parser
//! instance is shared between requests.

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

use crate::core::types::{Bundle, OperationOutcome, Resource, TagList};

pub const CONTENT_TYPE_XML: &str = "application/xml+fhir";
pub const CONTENT_TYPE_JSON: &str = "application/json+fhir";

/// Negotiable wire serializations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFormat {
    Xml,
    Json,
}

static FORMAT_ALIASES: Lazy<HashMap<&'static str, EncodingFormat>> = Lazy::new(|| {
    HashMap::from([
        ("xml", EncodingFormat::Xml),
        ("text/xml", EncodingFormat::Xml),
        ("application/xml", EncodingFormat::Xml),
        (CONTENT_TYPE_XML, EncodingFormat::Xml),
        ("json", EncodingFormat::Json),
        ("application/json", EncodingFormat::Json),
        (CONTENT_TYPE_JSON, EncodingFormat::Json),
    ])
});

impl EncodingFormat {
    /// MIME type written on responses in this format
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xml => CONTENT_TYPE_XML,
            Self::Json => CONTENT_TYPE_JSON,
        }
    }

    /// Short name used in the `_format` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }

    /// Look up a format by MIME type or short name
    ///
    /// Media-type parameters (`; charset=UTF-8`, `; q=0.8`) are ignored and
    /// matching is case-insensitive.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let media = value.split(';').next().unwrap_or_default().trim();
        FORMAT_ALIASES
            .get(media.to_ascii_lowercase().as_str())
            .copied()
    }

    /// Create a fresh parser for this format
    pub fn new_parser(&self, pretty: bool) -> Box<dyn Parser> {
        match self {
            Self::Xml => Box::new(SerdeParser::new(XmlCodec { pretty })),
            Self::Json => Box::new(SerdeParser::new(JsonCodec { pretty })),
        }
    }
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_content_type(s).ok_or_else(|| format!("Unknown encoding: {s}"))
    }
}

/// Codec failures
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
}

/// Encode and decode the documents a binding exchanges
pub trait Parser {
    fn encoding(&self) -> EncodingFormat;

    fn encode_resource(&self, resource: &Resource, writer: &mut dyn Write)
        -> Result<(), ParserError>;
    fn parse_resource(&self, input: &str) -> Result<Resource, ParserError>;

    fn encode_bundle(&self, bundle: &Bundle, writer: &mut dyn Write) -> Result<(), ParserError>;
    fn parse_bundle(&self, input: &str) -> Result<Bundle, ParserError>;

    fn encode_tag_list(&self, tags: &TagList, writer: &mut dyn Write) -> Result<(), ParserError>;
    fn parse_tag_list(&self, input: &str) -> Result<TagList, ParserError>;

    fn encode_outcome(
        &self,
        outcome: &OperationOutcome,
        writer: &mut dyn Write,
    ) -> Result<(), ParserError>;
    fn parse_outcome(&self, input: &str) -> Result<OperationOutcome, ParserError>;

    fn encode_resource_to_string(&self, resource: &Resource) -> Result<String, ParserError> {
        let mut buf = Vec::new();
        self.encode_resource(resource, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn encode_tag_list_to_string(&self, tags: &TagList) -> Result<String, ParserError> {
        let mut buf = Vec::new();
        self.encode_tag_list(tags, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Serde backend for one wire syntax
trait Codec {
    const ENCODING: EncodingFormat;

    fn encode<T: Serialize>(
        &self,
        root: &str,
        value: &T,
        writer: &mut dyn Write,
    ) -> Result<(), ParserError>;

    fn decode<T: DeserializeOwned>(&self, input: &str) -> Result<T, ParserError>;
}

struct JsonCodec {
    pretty: bool,
}

impl Codec for JsonCodec {
    const ENCODING: EncodingFormat = EncodingFormat::Json;

    fn encode<T: Serialize>(
        &self,
        _root: &str,
        value: &T,
        writer: &mut dyn Write,
    ) -> Result<(), ParserError> {
        if self.pretty {
            serde_json::to_writer_pretty(writer, value)?;
        } else {
            serde_json::to_writer(writer, value)?;
        }
        Ok(())
    }

    fn decode<T: DeserializeOwned>(&self, input: &str) -> Result<T, ParserError> {
        Ok(serde_json::from_str(input)?)
    }
}

struct XmlCodec {
    pretty: bool,
}

impl Codec for XmlCodec {
    const ENCODING: EncodingFormat = EncodingFormat::Xml;

    fn encode<T: Serialize>(
        &self,
        root: &str,
        value: &T,
        writer: &mut dyn Write,
    ) -> Result<(), ParserError> {
        let mut xml = String::new();
        let mut ser = quick_xml::se::Serializer::with_root(&mut xml, Some(root))
            .map_err(|e| ParserError::Xml(e.to_string()))?;
        if self.pretty {
            ser.indent(' ', 2);
        }
        value
            .serialize(ser)
            .map_err(|e| ParserError::Xml(e.to_string()))?;
        writer.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn decode<T: DeserializeOwned>(&self, input: &str) -> Result<T, ParserError> {
        quick_xml::de::from_str(input).map_err(|e| ParserError::Xml(e.to_string()))
    }
}

struct SerdeParser<C> {
    codec: C,
}

impl<C: Codec> SerdeParser<C> {
    fn new(codec: C) -> Self {
        Self { codec }
    }
}

impl<C: Codec> Parser for SerdeParser<C> {
    fn encoding(&self) -> EncodingFormat {
        C::ENCODING
    }

    fn encode_resource(
        &self,
        resource: &Resource,
        writer: &mut dyn Write,
    ) -> Result<(), ParserError> {
        self.codec.encode(&resource.resource_type, resource, writer)
    }

    fn parse_resource(&self, input: &str) -> Result<Resource, ParserError> {
        self.codec.decode(input)
    }

    fn encode_bundle(&self, bundle: &Bundle, writer: &mut dyn Write) -> Result<(), ParserError> {
        self.codec.encode("Bundle", bundle, writer)
    }

    fn parse_bundle(&self, input: &str) -> Result<Bundle, ParserError> {
        self.codec.decode(input)
    }

    fn encode_tag_list(&self, tags: &TagList, writer: &mut dyn Write) -> Result<(), ParserError> {
        self.codec.encode("TagList", tags, writer)
    }

    fn parse_tag_list(&self, input: &str) -> Result<TagList, ParserError> {
        self.codec.decode(input)
    }

    fn encode_outcome(
        &self,
        outcome: &OperationOutcome,
        writer: &mut dyn Write,
    ) -> Result<(), ParserError> {
        self.codec.encode("OperationOutcome", outcome, writer)
    }

    fn parse_outcome(&self, input: &str) -> Result<OperationOutcome, ParserError> {
        self.codec.decode(input)
    }
}
