//! Polar

use super::{PkceRequirement, Provider, ProviderConfig, RefreshScopes};
use crate::error::AuthResult;
use crate::types::ClientCredentials;

const AUTHORIZATION_ENDPOINT: &str = "https://polar.sh/oauth2/authorize";
const TOKEN_ENDPOINT: &str = "https://api.polar.sh/v1/oauth2/token";
const REVOCATION_ENDPOINT: &str = "https://api.polar.sh/v1/oauth2/revoke";

/// Polar endpoints; every flow must use PKCE (S256) and refreshes keep the
/// granted scope
#[must_use]
pub fn polar_config() -> ProviderConfig {
    ProviderConfig::builder()
        .name("Polar")
        .authorization_endpoint(AUTHORIZATION_ENDPOINT)
        .token_endpoint(TOKEN_ENDPOINT)
        .revocation_endpoint(REVOCATION_ENDPOINT)
        .pkce(PkceRequirement::Required)
        .refresh_scopes(RefreshScopes::Omit)
        .build()
}

/// Polar provider with a default client
///
/// # Errors
///
/// Returns `OAuthError::InvalidConfig` for unusable credentials.
pub fn polar(credentials: ClientCredentials) -> AuthResult<Provider> {
    Provider::new(polar_config(), credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PkcePair;

    #[test]
    fn test_polar_preset() {
        let polar = polar(ClientCredentials::new("CID", "secret", "https://app.example/cb")).unwrap();
        assert_eq!(polar.name(), "Polar");

        let pkce = PkcePair::generate().unwrap();
        let url = polar.authorization_url("st", &["openid", "email"], Some(&pkce)).unwrap();
        assert!(url.as_str().starts_with("https://polar.sh/oauth2/authorize?response_type=code&"));
        assert!(url.as_str().contains(&format!("code_challenge={}", pkce.challenge())));
    }
}
