//! Response sinks (server side) and received responses (client side)

use std::collections::BTreeMap;
use std::io::Write;

use crate::core::constants::HEADER_CONTENT_TYPE;

/// Abstract writable response provided by the transport
pub trait ResponseSink {
    fn set_status(&mut self, status: u16);
    fn set_content_type(&mut self, content_type: &str);
    fn set_character_encoding(&mut self, charset: &str);
    fn add_header(&mut self, name: &str, value: &str);
    fn writer(&mut self) -> &mut dyn Write;
}

/// In-memory response sink
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<u16>,
    content_type: Option<String>,
    charset: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Full `Content-Type` header value including the charset
    pub fn content_type_header(&self) -> Option<String> {
        self.content_type.as_ref().map(|ct| match &self.charset {
            Some(charset) => format!("{ct}; charset={charset}"),
            None => ct.clone(),
        })
    }

    /// First value of a header (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// View this response as a client would receive it
    pub fn into_client_response(self) -> ClientResponse {
        let mut response = ClientResponse::new(
            self.status.unwrap_or(200),
            self.content_type_header().as_deref(),
            String::from_utf8_lossy(&self.body).into_owned(),
        );
        for (name, value) in &self.headers {
            response = response.with_header(name, value.clone());
        }
        response
    }
}

impl ResponseSink for BufferedResponse {
    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }

    fn set_character_encoding(&mut self, charset: &str) {
        self.charset = Some(charset.to_string());
    }

    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.body
    }
}

/// A response received by the client transport
#[derive(Debug, Clone)]
pub struct ClientResponse {
    status: u16,
    headers: BTreeMap<String, Vec<String>>,
    body: String,
}

impl ClientResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        if let Some(ct) = content_type {
            headers.insert(HEADER_CONTENT_TYPE.to_string(), vec![ct.to_string()]);
        }
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(HEADER_CONTENT_TYPE)
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}
