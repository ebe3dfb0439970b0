//! HTTP requests and responses as plain data, plus the transport seam the
//! client drives.
//!
//! # Design
//! These types describe HTTP exchanges without performing any I/O. The
//! client builds `HttpRequest` values and interprets `HttpResponse` values;
//! the injected [`RequestHandler`] executes the round trip and owns every
//! transport policy (host resolution, authentication, timeouts, retries).
//! This separation keeps the core deterministic and lets tests script the
//! transport with canned responses.
//!
//! All fields use owned types (`String`, `Vec`) so requests and responses
//! can be captured, cloned and replayed freely.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Paths are relative to the service root (no leading slash); resolving
/// them against a host is the [`RequestHandler`]'s job, as is encoding
/// `query` pairs into the final URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::bare(HttpMethod::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::bare(HttpMethod::Delete, path)
    }

    /// POST carrying a JSON body.
    pub fn post(path: impl Into<String>, body: String) -> Self {
        Self::with_json_body(HttpMethod::Post, path, body)
    }

    /// PUT carrying a JSON body.
    pub fn put(path: impl Into<String>, body: String) -> Self {
        Self::with_json_body(HttpMethod::Put, path, body)
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    fn bare(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json_body(method: HttpMethod, path: impl Into<String>, body: String) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }
}

/// An HTTP response described as plain data.
///
/// Produced by the [`RequestHandler`] after executing an [`HttpRequest`].
/// The client only ever reads `status` and `body`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// The injected transport: executes one request and returns whatever the
/// server answered.
///
/// Implementations must hand back non-2xx responses as ordinary
/// [`HttpResponse`] values rather than failing, so the client can surface
/// the server's status and body to the caller. `Error` is reserved for
/// failures that produced no response at all.
pub trait RequestHandler {
    /// Transport-level failure (connection refused, TLS handshake, ...).
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error>;
}
