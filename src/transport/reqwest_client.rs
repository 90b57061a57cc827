//! `reqwest`-backed transport

use async_trait::async_trait;
use std::time::Duration;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::TransportError;

/// Default cap on a response body
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024; // 1MB

/// Transport over a shared `reqwest::Client`
///
/// Cloning is cheap and shares the underlying connection pool. Redirects are
/// never followed: token endpoints answer directly. Response bodies larger
/// than the configured limit are rejected.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    max_body_size: usize,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(None)
    }

    /// Create a transport whose client enforces `timeout` on every request
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the TLS backend cannot be
    /// initialized.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::from_client(builder.build()?))
    }

    /// Wrap an existing client, keeping its configuration
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Set the largest response body accepted (default 1MB)
    #[must_use]
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Largest response body accepted
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>, TransportError> {
        let too_large = || {
            TransportError::Request(format!(
                "response body exceeds {} bytes",
                self.max_body_size
            ))
        };

        let declared = response.content_length().unwrap_or(0);
        if usize::try_from(declared)
            .ok()
            .is_none_or(|len| len > self.max_body_size)
        {
            return Err(too_large());
        }

        let mut body = Vec::with_capacity(usize::try_from(declared).unwrap_or(0));
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_body_size {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body).send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = self.read_body(response).await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
