//! Host-agnostic request and response representations
//!
//! The Worker converts `worker::Request` into an [`InboundRequest`] and an
//! [`HttpReply`] back into `worker::Response`. Cached entries are stored as
//! `HttpReply` too, so a cache hit and a live reply share one shape.

use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::error::{Error, Result};

pub const CONTENT_TYPE_JSON: &str = "application/json";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Options,
    Other(String),
}

impl Method {
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "OPTIONS" => Self::Options,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<String>,
}

impl InboundRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
        }
    }

    pub fn get(url: &str) -> Result<Self> {
        Ok(Self::new(Method::Get, parse_url(url)?))
    }

    pub fn post(url: &str, body: impl Into<String>) -> Result<Self> {
        Ok(Self::new(Method::Post, parse_url(url)?).with_body(body))
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// First value of a query parameter
    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Query parameter that is present and not blank
    pub fn non_empty_param(&self, name: &str) -> Option<String> {
        self.param(name).filter(|value| !value.trim().is_empty())
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.url.query_pairs().any(|(key, _)| key == name)
    }

    /// `scheme://host[:port]`, the prefix of every synthetic cache key
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::ProcessingFailed(format!("invalid request URL: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn json<T: Serialize>(status: u16, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(status, body).with_header("Content-Type", CONTENT_TYPE_JSON))
    }

    /// `{"error": ...}` with the status the error maps to
    pub fn from_error(err: &Error) -> Self {
        let body = json!({ "error": err.to_string() }).to_string();
        Self::new(err.status_code(), body).with_header("Content-Type", CONTENT_TYPE_JSON)
    }

    pub fn no_content() -> Self {
        Self::new(204, Vec::new())
    }

    /// Sets a header, replacing any existing value (names compare case-insensitively)
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn with_cors(mut self) -> Self {
        for (name, value) in CORS_HEADERS {
            self.set_header(name, value);
        }
        self
    }
}
