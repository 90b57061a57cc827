//! Error types for OAuth 2.0 operations

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Error payload returned by an authorization server
///
/// Carries the provider's `error` / `error_description` / `error_uri` fields
/// verbatim, plus the HTTP status the response arrived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Error code from the `error` field (e.g. `invalid_grant`)
    pub code: String,
    /// Human-readable description from `error_description`
    pub description: Option<String>,
    /// Documentation link from `error_uri`
    pub uri: Option<String>,
    /// HTTP status code of the response
    pub status: u16,
}

impl ProviderError {
    /// Error code used when a non-2xx response carries no `error` field
    pub const UNEXPECTED_STATUS: &'static str = "unexpected_status";

    /// Create a provider error from its code and description
    pub fn new(code: impl Into<String>, description: Option<String>, status: u16) -> Self {
        Self {
            code: code.into(),
            description,
            uri: None,
            status,
        }
    }

    /// Synthesize an error for a failure status whose body named no error
    #[must_use]
    pub fn unexpected_status(status: u16) -> Self {
        Self::new(
            Self::UNEXPECTED_STATUS,
            Some(format!("HTTP {status} without an OAuth error body")),
            status,
        )
    }

    /// Whether the provider reported `invalid_grant`
    #[must_use]
    pub fn is_invalid_grant(&self) -> bool {
        self.code == "invalid_grant"
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {description}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Errors raised by an [`HttpTransport`](crate::transport::HttpTransport)
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection could not be established
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Request failed for another network-level reason
    #[error("HTTP request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest includes the request URL in its message; strip it so query
        // strings never leak into logs
        let err = err.without_url();
        if err.is_timeout() {
            Self::Request(format!("timed out: {err}"))
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Errors that can occur during OAuth operations
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The operating system could not provide secure randomness
    #[error("Secure random source unavailable: {0}")]
    CryptoUnavailable(String),

    /// Endpoint is not an absolute http(s) URL
    #[error("Invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as supplied by the caller
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },

    /// Code verifier violates RFC 7636 length or character rules
    #[error("Invalid code verifier: {0}")]
    InvalidCodeVerifier(String),

    /// Network-level failure reaching the provider
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Provider response could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Provider rejected an authorization code exchange or refresh
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(ProviderError),

    /// Provider rejected the grant as invalid, expired or revoked
    #[error("Invalid grant: {0}")]
    InvalidGrant(ProviderError),

    /// Provider explicitly rejected a revocation request
    #[error("Token revocation failed: {0}")]
    RevocationFailed(ProviderError),

    /// Operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Verifier use conflicts with the provider's PKCE policy
    #[error("PKCE policy violation: {0}")]
    Pkce(String),

    /// Provider does not support the requested operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for OAuth operations
pub type AuthResult<T> = Result<T, OAuthError>;

impl OAuthError {
    /// Create an invalid endpoint error
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a PKCE policy error
    pub fn pkce(msg: impl Into<String>) -> Self {
        Self::Pkce(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Classify a rejected code exchange or refresh
    #[must_use]
    pub fn token_exchange(err: ProviderError) -> Self {
        if err.is_invalid_grant() {
            Self::InvalidGrant(err)
        } else {
            Self::TokenExchangeFailed(err)
        }
    }

    /// Provider payload, if this error came from the authorization server
    #[must_use]
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::TokenExchangeFailed(err) | Self::InvalidGrant(err) | Self::RevocationFailed(err) => {
                Some(err)
            }
            _ => None,
        }
    }

    /// Whether the caller must send the user through authorization again
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::InvalidGrant(_))
    }

    /// Whether retrying the same call later could succeed
    ///
    /// Transport failures and provider-side outages (`temporarily_unavailable`,
    /// `server_error`, 5xx, 429) are retriable. Everything else needs different
    /// input or a provider fix.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            _ => self.provider_error().is_some_and(|err| {
                matches!(err.code.as_str(), "temporarily_unavailable" | "server_error")
                    || err.status >= 500
                    || err.status == 429
            }),
        }
    }
}
