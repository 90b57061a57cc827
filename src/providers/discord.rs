//! Discord

use super::{PkceRequirement, Provider, ProviderConfig, RefreshScopes};
use crate::error::AuthResult;
use crate::types::ClientCredentials;

const AUTHORIZATION_ENDPOINT: &str = "https://discord.com/oauth2/authorize";
const TOKEN_ENDPOINT: &str = "https://discord.com/api/oauth2/token";
const REVOCATION_ENDPOINT: &str = "https://discord.com/api/oauth2/token/revoke";

/// Discord endpoints; PKCE is accepted but not required
#[must_use]
pub fn discord_config() -> ProviderConfig {
    ProviderConfig::builder()
        .name("Discord")
        .authorization_endpoint(AUTHORIZATION_ENDPOINT)
        .token_endpoint(TOKEN_ENDPOINT)
        .revocation_endpoint(REVOCATION_ENDPOINT)
        .pkce(PkceRequirement::Optional)
        .refresh_scopes(RefreshScopes::Omit)
        .build()
}

/// Discord provider with a default client
///
/// # Errors
///
/// Returns `OAuthError::InvalidConfig` for unusable credentials.
pub fn discord(credentials: ClientCredentials) -> AuthResult<Provider> {
    Provider::new(discord_config(), credentials)
}
