//! Authorization request URL construction (RFC 6749 §4.1.1)

use super::pkce::PkcePair;
use crate::error::{AuthResult, OAuthError};
use crate::types::ClientCredentials;
use crate::utils::{join_scopes, percent_encode};
use url::Url;

/// Parse an endpoint, accepting only absolute http(s) URLs
pub(crate) fn parse_endpoint(endpoint: &str) -> AuthResult<Url> {
    let url = Url::parse(endpoint).map_err(|e| OAuthError::invalid_endpoint(endpoint, e.to_string()))?;
    match url.scheme() {
        "https" | "http" if url.has_host() => Ok(url),
        "https" | "http" => Err(OAuthError::invalid_endpoint(endpoint, "missing host")),
        scheme => Err(OAuthError::invalid_endpoint(
            endpoint,
            format!("unsupported scheme {scheme:?}"),
        )),
    }
}

/// Build the URL the user is sent to in order to authorize this client.
///
/// Parameters are appended in the order `response_type`, `client_id`,
/// `redirect_uri`, `state`, `scope`, `code_challenge`,
/// `code_challenge_method`. `scope` is omitted for an empty list. Query
/// parameters already present on `endpoint` are kept in front.
///
/// # Errors
///
/// Returns `OAuthError::InvalidEndpoint` if `endpoint` is not an absolute
/// http(s) URL.
///
/// # Example
/// ```
/// use oauth2_codegrant::auth::build_authorization_url;
/// use oauth2_codegrant::types::ClientCredentials;
///
/// let creds = ClientCredentials::new("CID", "secret", "https://app.example/cb");
/// let url = build_authorization_url(
///     "https://example.com/authorize",
///     &creds,
///     "abc",
///     &["read", "write"],
///     None,
/// )
/// .unwrap();
/// assert!(url.as_str().ends_with("&state=abc&scope=read%20write"));
/// ```
pub fn build_authorization_url<S: AsRef<str>>(
    endpoint: &str,
    credentials: &ClientCredentials,
    state: &str,
    scopes: &[S],
    pkce: Option<&PkcePair>,
) -> AuthResult<Url> {
    let mut url = parse_endpoint(endpoint)?;

    let scope = join_scopes(scopes);
    let mut params = vec![
        ("response_type", "code"),
        ("client_id", credentials.client_id()),
        ("redirect_uri", credentials.redirect_uri()),
        ("state", state),
    ];
    if let Some(scope) = scope.as_deref() {
        params.push(("scope", scope));
    }
    if let Some(pkce) = pkce {
        params.push(("code_challenge", pkce.challenge()));
        params.push(("code_challenge_method", pkce.method().as_str()));
    }

    let mut query = url.query().unwrap_or_default().to_string();
    for (key, value) in params {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(key);
        query.push('=');
        query.push_str(&percent_encode(value));
    }
    url.set_query(Some(&query));

    tracing::debug!(
        host = url.host_str().unwrap_or_default(),
        pkce = pkce.is_some(),
        "Built authorization URL"
    );

    Ok(url)
}
