//! HTTP transport types and the blocking transport used by default.
//!
//! # Design
//! Requests and responses are plain data. The dispatcher builds an
//! `HttpRequest`, hands it to a `Transport`, and parses the `HttpResponse`
//! that comes back. Only `Transport` implementations touch the network, so
//! everything else stays deterministic and easy to test with a closure.
//!
//! All fields use owned types (`String`, `Vec`) so values can be recorded by
//! test transports and moved across threads without lifetime concerns.

use std::time::Duration;

/// Error produced by a `Transport` when the round-trip itself fails
/// (connection refused, DNS, timeout). Passed through to the caller as-is.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP method for a request. The remote API only accepts `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// An HTTP request described as plain data.
///
/// Built by `RequestDispatcher::build_request`. `query` is sorted by key and
/// always carries `api_key` and `api_action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    /// Look up a query parameter by exact name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// The status is informational only: the envelope in `body` decides whether
/// a call succeeded.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Executes one HTTP round-trip.
///
/// Implementations must be safe to share between threads; a single client
/// may be used concurrently.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Blocking transport backed by `ureq`.
///
/// Non-2xx responses are returned as data rather than `Err` so the body can
/// still be inspected for an envelope.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest { method, url, query } = request;
        let mut response = match method {
            HttpMethod::Get => self.agent.get(&url).query_pairs(query).call()?,
        };
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok(HttpResponse { status, body })
    }
}
