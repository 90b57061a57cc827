//! HTTP transport used to reach token and revocation endpoints
//!
//! The engine talks to providers only through [`HttpTransport`]. The default
//! implementation is [`ReqwestTransport`]; tests and applications with their
//! own HTTP stack can supply another.

pub mod reqwest_client;

use async_trait::async_trait;
use url::Url;

use crate::error::TransportError;

pub use reqwest::Method;
pub use reqwest_client::{DEFAULT_MAX_BODY_SIZE, ReqwestTransport};

/// Outbound HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL
    pub url: Url,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Vec<u8>,
}

/// HTTP response as seen by the engine
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Look up a header value, ignoring name case
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Value of the `Content-Type` header
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Transport trait for sending requests to an authorization server
///
/// One call is one request/response cycle. Implementations must not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the complete response
    ///
    /// Any HTTP status is a successful send; only network-level failures are
    /// errors.
    ///
    /// # Errors
    /// Returns `TransportError` if the request could not be completed
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = HttpResponse {
            status: 200,
            headers: vec![(
                "Content-Type".to_string(),
                "application/json; charset=utf-8".to_string(),
            )],
            body: Vec::new(),
        };
        assert_eq!(response.content_type(), Some("application/json; charset=utf-8"));
        assert_eq!(response.header("CONTENT-TYPE"), response.content_type());
        assert_eq!(response.header("x-missing"), None);
    }
}
