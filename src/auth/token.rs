//! Token response from the token endpoint

use crate::utils::REDACTED;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Tokens issued by a successful code exchange or refresh
///
/// Each value is built fresh from one provider response and owned by the
/// caller; the engine keeps no copy. Fields the provider sent beyond the
/// RFC 6749 set (e.g. `id_token`) are kept verbatim in [`extra`](Self::extra).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTokens")]
pub struct OAuth2Tokens {
    access_token: String,

    token_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Wire shape before `expires_in` is interpreted
#[derive(Deserialize)]
struct RawTokens {
    access_token: String,
    token_type: String,
    #[serde(default)]
    expires_in: Option<Value>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawTokens> for OAuth2Tokens {
    fn from(raw: RawTokens) -> Self {
        let mut extra = raw.extra;
        let expires_in = raw.expires_in.and_then(|value| {
            let seconds = lifetime_seconds(&value);
            if seconds.is_none() {
                // Unusable lifetime; keep what the provider sent
                extra.insert("expires_in".to_string(), value);
            }
            seconds
        });

        Self {
            access_token: raw.access_token,
            token_type: raw.token_type,
            expires_in,
            refresh_token: raw.refresh_token,
            scope: raw.scope,
            extra,
        }
    }
}

impl OAuth2Tokens {
    /// Access token for calling protected resources
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Token type as sent by the provider (usually `Bearer`)
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Lifetime of the access token in seconds, if the provider said
    #[must_use]
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    /// Refresh token, present only if this response carried one
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Whether this response carried a refresh token
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Granted scope string, if the provider returned one
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Granted scopes split on spaces
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|scope| scope.split(' ').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Provider-specific fields outside the standard token response
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Look up one provider-specific field
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// OpenID Connect ID token, if present (not verified)
    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.claim("id_token").and_then(Value::as_str)
    }

    /// Absolute expiry given the time the response was received
    #[must_use]
    pub fn expires_at(&self, issued_at: SystemTime) -> Option<SystemTime> {
        self.expires_in
            .and_then(|seconds| issued_at.checked_add(Duration::from_secs(seconds)))
    }

    /// Value for an `Authorization` header
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for OAuth2Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Tokens")
            .field("access_token", &REDACTED)
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("scope", &self.scope)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Interpret `expires_in` as whole non-negative seconds
///
/// Accepts integers, integral floats (`3600.0`) and numeric strings.
/// `null`, negatives, fractions and text yield `None`.
fn lifetime_seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
