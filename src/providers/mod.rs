//! Provider adapters
//!
//! A [`Provider`] binds one authorization server's endpoints and protocol
//! quirks ([`ProviderConfig`]) to an [`OAuth2Client`]. Presets for the
//! supported providers live in the submodules.

mod discord;
mod epic_games;
mod polar;

pub use discord::{discord, discord_config};
pub use epic_games::{epic_games, epic_games_config};
pub use polar::{polar, polar_config};

use crate::auth::{CodeChallengeMethod, OAuth2Client, OAuth2Tokens, PkcePair, parse_endpoint};
use crate::error::{AuthResult, OAuthError};
use crate::types::{ClientAuthStyle, ClientCredentials, ClientOptions};
use typed_builder::TypedBuilder;
use url::Url;

/// How a provider treats PKCE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PkceRequirement {
    /// Provider rejects or ignores PKCE; never send a verifier
    Unsupported,
    /// Provider accepts PKCE but does not demand it
    #[default]
    Optional,
    /// Every flow must carry a verifier
    Required,
}

/// What to do with caller scopes on refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshScopes {
    /// Send them as the `scope` parameter when non-empty
    #[default]
    Forward,
    /// Never send `scope`; the provider keeps the originally granted scope
    Omit,
}

/// Endpoints and protocol variations of one provider
#[derive(Debug, Clone, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for ProviderConfig"),
    builder_type(doc = "Builder for ProviderConfig", vis = "pub"),
    build_method(doc = "Build the ProviderConfig")
)]
pub struct ProviderConfig {
    /// Display name used in errors and logs
    #[builder(setter(into))]
    pub name: String,

    /// Authorization endpoint URL
    #[builder(setter(into))]
    pub authorization_endpoint: String,

    /// Token endpoint URL
    #[builder(setter(into))]
    pub token_endpoint: String,

    /// Revocation endpoint URL, if the provider supports RFC 7009
    #[builder(default, setter(strip_option, into))]
    pub revocation_endpoint: Option<String>,

    /// PKCE policy
    #[builder(default)]
    pub pkce: PkceRequirement,

    /// Refresh scope policy
    #[builder(default)]
    pub refresh_scopes: RefreshScopes,

    /// Client authentication style at the token endpoint
    #[builder(default)]
    pub client_auth: ClientAuthStyle,
}

impl ProviderConfig {
    fn validate(&self) -> AuthResult<()> {
        parse_endpoint(&self.authorization_endpoint)?;
        parse_endpoint(&self.token_endpoint)?;
        if let Some(endpoint) = &self.revocation_endpoint {
            parse_endpoint(endpoint)?;
        }
        Ok(())
    }
}

/// OAuth 2.0 client bound to one provider
#[derive(Debug, Clone)]
pub struct Provider {
    config: ProviderConfig,
    client: OAuth2Client,
}

impl Provider {
    /// Create a provider with a default client using the provider's
    /// client authentication style
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::InvalidEndpoint` for a malformed endpoint in
    /// `config`, or the client construction error.
    pub fn new(config: ProviderConfig, credentials: ClientCredentials) -> AuthResult<Self> {
        let options = ClientOptions::builder()
            .client_auth(config.client_auth)
            .build();
        let client = OAuth2Client::builder(credentials).options(options).build()?;
        Self::with_client(config, client)
    }

    /// Create a provider over an existing client
    ///
    /// The client's own options (including its client authentication style)
    /// are used as-is.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::InvalidEndpoint` for a malformed endpoint in `config`.
    pub fn with_client(config: ProviderConfig, client: OAuth2Client) -> AuthResult<Self> {
        config.validate()?;
        Ok(Self { config, client })
    }

    /// Provider display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Provider configuration
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Underlying client
    #[must_use]
    pub fn client(&self) -> &OAuth2Client {
        &self.client
    }

    /// Build the authorization URL
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::Pkce` if `pkce` conflicts with the provider's
    /// PKCE policy. Providers that require PKCE also require S256.
    pub fn authorization_url<S: AsRef<str>>(
        &self,
        state: &str,
        scopes: &[S],
        pkce: Option<&PkcePair>,
    ) -> AuthResult<Url> {
        self.check_pkce(pkce.is_some())?;
        let plain = pkce.is_some_and(|pkce| pkce.method() != CodeChallengeMethod::S256);
        if plain && self.config.pkce == PkceRequirement::Required {
            return Err(OAuthError::pkce(format!(
                "{} requires the S256 challenge method",
                self.config.name
            )));
        }
        self.client
            .authorization_url(&self.config.authorization_endpoint, state, scopes, pkce)
    }

    /// Exchange the authorization code received on the redirect
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::Pkce` on a policy conflict, otherwise see
    /// [`OAuth2Client::exchange_authorization_code`].
    pub async fn validate_authorization_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> AuthResult<OAuth2Tokens> {
        self.check_pkce(code_verifier.is_some())?;
        self.client
            .exchange_authorization_code(&self.config.token_endpoint, code, code_verifier)
            .await
    }

    /// Refresh an access token
    ///
    /// With [`RefreshScopes::Omit`] the `scopes` argument is ignored.
    ///
    /// # Errors
    ///
    /// See [`OAuth2Client::refresh_access_token`].
    pub async fn refresh_access_token<S: AsRef<str>>(
        &self,
        refresh_token: &str,
        scopes: &[S],
    ) -> AuthResult<OAuth2Tokens> {
        let endpoint = &self.config.token_endpoint;
        match self.config.refresh_scopes {
            RefreshScopes::Forward => {
                self.client
                    .refresh_access_token(endpoint, refresh_token, scopes)
                    .await
            }
            RefreshScopes::Omit => {
                if !scopes.is_empty() {
                    tracing::debug!(
                        provider = %self.config.name,
                        "Provider does not take scopes on refresh; ignoring them"
                    );
                }
                self.client
                    .refresh_access_token::<&str>(endpoint, refresh_token, &[])
                    .await
            }
        }
    }

    /// Revoke a token
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::Unsupported` if the provider has no revocation
    /// endpoint, otherwise see [`OAuth2Client::revoke_token`].
    pub async fn revoke_token(&self, token: &str) -> AuthResult<()> {
        let endpoint = self.config.revocation_endpoint.as_deref().ok_or_else(|| {
            OAuthError::Unsupported(format!("{} has no token revocation endpoint", self.config.name))
        })?;
        self.client.revoke_token(endpoint, token).await
    }

    fn check_pkce(&self, verifier_present: bool) -> AuthResult<()> {
        match (self.config.pkce, verifier_present) {
            (PkceRequirement::Required, false) => Err(OAuthError::pkce(format!(
                "{} requires a PKCE code verifier",
                self.config.name
            ))),
            (PkceRequirement::Unsupported, true) => Err(OAuthError::pkce(format!(
                "{} does not support PKCE",
                self.config.name
            ))),
            _ => Ok(()),
        }
    }
}
