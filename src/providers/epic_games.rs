//! Epic Games

use super::{PkceRequirement, Provider, ProviderConfig, RefreshScopes};
use crate::error::AuthResult;
use crate::types::{ClientAuthStyle, ClientCredentials};

const AUTHORIZATION_ENDPOINT: &str = "https://www.epicgames.com/id/authorize";
const TOKEN_ENDPOINT: &str = "https://api.epicgames.dev/epic/oauth/v2/token";
const REVOCATION_ENDPOINT: &str = "https://api.epicgames.dev/epic/oauth/v2/revoke";

/// Epic Games endpoints
///
/// Epic Account Services authenticates clients with HTTP Basic and does not
/// take PKCE.
#[must_use]
pub fn epic_games_config() -> ProviderConfig {
    ProviderConfig::builder()
        .name("Epic Games")
        .authorization_endpoint(AUTHORIZATION_ENDPOINT)
        .token_endpoint(TOKEN_ENDPOINT)
        .revocation_endpoint(REVOCATION_ENDPOINT)
        .pkce(PkceRequirement::Unsupported)
        .refresh_scopes(RefreshScopes::Omit)
        .client_auth(ClientAuthStyle::BasicAuth)
        .build()
}

/// Epic Games provider with a default client
///
/// # Errors
///
/// Returns `OAuthError::InvalidConfig` for unusable credentials.
pub fn epic_games(credentials: ClientCredentials) -> AuthResult<Provider> {
    Provider::new(epic_games_config(), credentials)
}
