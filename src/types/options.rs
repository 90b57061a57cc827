//! Engine configuration

use std::time::Duration;
use typed_builder::TypedBuilder;

/// Default timeout for a single token-endpoint request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How client credentials reach the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientAuthStyle {
    /// `client_id` and `client_secret` as form fields in the request body
    #[default]
    RequestBody,
    /// `Authorization: Basic base64(client_id:client_secret)`
    BasicAuth,
}

/// Options for [`OAuth2Client`](crate::auth::OAuth2Client)
#[derive(Debug, Clone, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for ClientOptions"),
    builder_type(doc = "Builder for ClientOptions", vis = "pub"),
    build_method(doc = "Build the ClientOptions")
)]
pub struct ClientOptions {
    /// Upper bound on each token-endpoint round trip
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,

    /// Client authentication style for token and revocation requests
    #[builder(default)]
    pub client_auth: ClientAuthStyle,

    /// `User-Agent` header sent with every request
    #[builder(default, setter(strip_option, into))]
    pub user_agent: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert_eq!(options.timeout, DEFAULT_TIMEOUT);
        assert_eq!(options.client_auth, ClientAuthStyle::RequestBody);
        assert!(options.user_agent.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let options = ClientOptions::builder()
            .timeout(Duration::from_secs(5))
            .client_auth(ClientAuthStyle::BasicAuth)
            .user_agent("my-app/1.0")
            .build();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.client_auth, ClientAuthStyle::BasicAuth);
        assert_eq!(options.user_agent.as_deref(), Some("my-app/1.0"));
    }
}
