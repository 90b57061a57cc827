//! Client registration credentials

use crate::error::{AuthResult, OAuthError};
use crate::utils::REDACTED;
use std::fmt;

/// Credentials issued to this application by the authorization server
///
/// The secret never appears in `Debug` output or log events.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl ClientCredentials {
    /// Create credentials for a confidential client
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Create credentials for a public client that authenticates with PKCE only
    pub fn public(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Load credentials from `<PREFIX>_CLIENT_ID`, `<PREFIX>_CLIENT_SECRET`
    /// and `<PREFIX>_REDIRECT_URI`.
    ///
    /// The secret is optional; a missing id or redirect URI is an error.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::InvalidConfig` naming the missing variable.
    pub fn from_env(prefix: &str) -> AuthResult<Self> {
        let var = |name: &str| std::env::var(format!("{prefix}_{name}")).ok();
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                OAuthError::invalid_config(format!("environment variable {prefix}_{name} is not set"))
            })
        };

        Ok(Self {
            client_id: required("CLIENT_ID")?,
            client_secret: var("CLIENT_SECRET").filter(|secret| !secret.is_empty()),
            redirect_uri: required("REDIRECT_URI")?,
        })
    }

    /// OAuth client identifier
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret, absent for public clients
    #[must_use]
    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    /// Registered redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Check that the redirect URI is an absolute URI
    pub(crate) fn validate(&self) -> AuthResult<()> {
        if self.client_id.is_empty() {
            return Err(OAuthError::invalid_config("client_id is empty"));
        }
        url::Url::parse(&self.redirect_uri).map_err(|e| {
            OAuthError::invalid_config(format!("redirect_uri is not an absolute URI: {e}"))
        })?;
        Ok(())
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| REDACTED))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let creds = ClientCredentials::new("CID", "s3cr3t", "https://app.example/cb");
        let debug = format!("{creds:?}");
        assert!(debug.contains("CID"));
        assert!(debug.contains(REDACTED));
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn test_public_client_has_no_secret() {
        let creds = ClientCredentials::public("CID", "https://app.example/cb");
        assert_eq!(creds.client_secret(), None);
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_redirect() {
        let creds = ClientCredentials::new("CID", "secret", "/callback");
        assert!(matches!(creds.validate(), Err(OAuthError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_env() {
        // Unique prefix keeps this independent of other tests
        let prefix = "OAUTH2_CODEGRANT_TEST_FROM_ENV";
        // SAFETY: the variables are unique to this test
        unsafe {
            std::env::set_var(format!("{prefix}_CLIENT_ID"), "env-id");
            std::env::set_var(format!("{prefix}_REDIRECT_URI"), "https://app.example/cb");
        }

        let creds = ClientCredentials::from_env(prefix).unwrap();
        assert_eq!(creds.client_id(), "env-id");
        assert_eq!(creds.client_secret(), None);

        let err = ClientCredentials::from_env("OAUTH2_CODEGRANT_TEST_MISSING").unwrap_err();
        assert!(err.to_string().contains("OAUTH2_CODEGRANT_TEST_MISSING_CLIENT_ID"));
    }
}
