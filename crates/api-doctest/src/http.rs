//! HTTP client boundary.
//!
//! api-doctest never performs HTTP itself. A test suite plugs in an
//! [`ApiClient`] that executes calls and hands back the request that was
//! sent together with the response that came back.

use crate::item::NamedValues;
use crate::result::DocTestResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
}

impl HttpMethod {
    /// Convert to string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request as actually sent by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Target URI
    pub uri: String,
    /// HTTP method
    pub method: HttpMethod,
    /// All request headers
    pub headers: NamedValues,
    /// All request cookies
    pub cookies: NamedValues,
}

impl ApiRequest {
    /// Create a request without headers or cookies
    #[must_use]
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method,
            headers: NamedValues::new(),
            cookies: NamedValues::new(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a cookie
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name, value);
        self
    }
}

/// Response as received by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Reason phrase
    pub reason_phrase: String,
    /// Body, if any
    pub payload: Option<String>,
    /// All response headers
    pub headers: NamedValues,
}

impl ApiResponse {
    /// Create a response without body or headers
    #[must_use]
    pub fn new(status_code: u16, reason_phrase: impl Into<String>) -> Self {
        Self {
            status_code,
            reason_phrase: reason_phrase.into(),
            payload: None,
            headers: NamedValues::new(),
        }
    }

    /// Set body
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Request/response pair produced by one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Request as sent
    pub request: ApiRequest,
    /// Response as received
    pub response: ApiResponse,
}

impl Exchange {
    /// Pair a request with its response
    #[must_use]
    pub const fn new(request: ApiRequest, response: ApiResponse) -> Self {
        Self { request, response }
    }
}

/// File handed to [`ApiClient::upload`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Multipart parameter name
    pub param_name: String,
    /// File name sent to the server
    pub filename: String,
    /// Location on disk
    pub path: PathBuf,
    /// MIME type
    pub mime_type: String,
    /// Length in bytes
    pub size_bytes: u64,
}

/// Cookie held by the client's session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Expiry, if the cookie is persistent
    pub expires: Option<String>,
    /// Path
    pub path: String,
    /// Domain
    pub domain: String,
    /// Secure flag
    pub secure: bool,
    /// HTTP only flag
    pub http_only: bool,
}

impl Cookie {
    /// Session cookie for `/` on `localhost`
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: None,
            path: "/".to_string(),
            domain: "localhost".to_string(),
            secure: false,
            http_only: false,
        }
    }
}

/// Cookie state of the client's session
pub trait CookieJar {
    /// Look up a cookie
    fn cookie(&self, name: &str) -> Option<Cookie>;

    /// Add or replace a cookie
    fn add_cookie(&mut self, cookie: Cookie);

    /// Remove every cookie
    fn clear_cookies(&mut self);

    /// Value of a cookie
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.cookie(name).map(|c| c.value)
    }
}

/// Cookie jar kept in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    cookies: Vec<Cookie>,
}

impl MemoryCookieJar {
    /// Create an empty jar
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cookies
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether the jar is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie(&self, name: &str) -> Option<Cookie> {
        self.cookies.iter().find(|c| c.name == name).cloned()
    }

    fn add_cookie(&mut self, cookie: Cookie) {
        if let Some(existing) = self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
    }

    fn clear_cookies(&mut self) {
        self.cookies.clear();
    }
}

/// HTTP client collaborator
///
/// Bodies arrive already converted to JSON values so the trait stays
/// object safe.
pub trait ApiClient {
    /// Perform a GET
    fn get(&mut self, uri: &str) -> DocTestResult<Exchange>;

    /// Perform a POST
    fn post(&mut self, uri: &str, body: Option<&serde_json::Value>) -> DocTestResult<Exchange>;

    /// Perform a PUT
    fn put(&mut self, uri: &str, body: Option<&serde_json::Value>) -> DocTestResult<Exchange>;

    /// Perform a DELETE
    fn delete(&mut self, uri: &str, body: Option<&serde_json::Value>) -> DocTestResult<Exchange>;

    /// Perform a multipart POST carrying one file
    fn upload(&mut self, uri: &str, file: &UploadFile) -> DocTestResult<Exchange>;

    /// Session cookies
    fn cookie_jar(&mut self) -> &mut dyn CookieJar;
}
