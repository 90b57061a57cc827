//! OAuth 2.0 Authorization Code client: code exchange, refresh, revocation

use super::authorization::{build_authorization_url, parse_endpoint};
use super::codec::{DecodeError, TokenRequest, decode_revocation_response, decode_token_response};
use super::pkce::PkcePair;
use super::token::OAuth2Tokens;
use crate::error::{AuthResult, OAuthError, ProviderError, TransportError};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
use crate::types::{ClientCredentials, ClientOptions};
use crate::utils::truncate_for_log;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Builder for [`OAuth2Client`]
pub struct OAuth2ClientBuilder {
    credentials: ClientCredentials,
    options: Option<ClientOptions>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl OAuth2ClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            options: None,
            transport: None,
        }
    }

    /// Set custom client options
    #[must_use]
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set a custom transport (default: [`ReqwestTransport`])
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::InvalidConfig` for an empty client id or a
    /// redirect URI that is not absolute, or `OAuthError::Transport` if the
    /// default transport cannot be created.
    pub fn build(self) -> AuthResult<OAuth2Client> {
        self.credentials.validate()?;
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        Ok(OAuth2Client {
            credentials: Arc::new(self.credentials),
            options: self.options.unwrap_or_default(),
            transport,
        })
    }
}

/// Generic OAuth 2.0 Authorization Code client
///
/// Holds only the client credentials, options and a transport handle. Every
/// token and PKCE value is passed in and returned; nothing is cached, so one
/// client can serve any number of concurrent flows. Clones share the
/// transport.
#[derive(Clone)]
pub struct OAuth2Client {
    credentials: Arc<ClientCredentials>,
    options: ClientOptions,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for OAuth2Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Client")
            .field("credentials", &self.credentials)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl OAuth2Client {
    /// Create a client with default options and transport
    ///
    /// # Errors
    ///
    /// See [`OAuth2ClientBuilder::build`].
    pub fn new(credentials: ClientCredentials) -> AuthResult<Self> {
        OAuth2ClientBuilder::new(credentials).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(credentials: ClientCredentials) -> OAuth2ClientBuilder {
        OAuth2ClientBuilder::new(credentials)
    }

    /// Get the client credentials
    #[must_use]
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Get the client options
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Build the authorization URL for this client
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::InvalidEndpoint` for a malformed endpoint.
    pub fn authorization_url<S: AsRef<str>>(
        &self,
        endpoint: &str,
        state: &str,
        scopes: &[S],
        pkce: Option<&PkcePair>,
    ) -> AuthResult<Url> {
        build_authorization_url(endpoint, &self.credentials, state, scopes, pkce)
    }

    /// Exchange an authorization code for tokens
    ///
    /// Pass the verifier exactly when the authorization URL carried a PKCE
    /// challenge.
    ///
    /// # Errors
    ///
    /// - `InvalidGrant` if the code is expired, used, or fails PKCE
    /// - `TokenExchangeFailed` for other provider rejections
    /// - `Transport` on network failure or timeout
    /// - `MalformedResponse` if the success body cannot be decoded
    pub async fn exchange_authorization_code(
        &self,
        endpoint: &str,
        code: &str,
        code_verifier: Option<&str>,
    ) -> AuthResult<OAuth2Tokens> {
        let request = TokenRequest::AuthorizationCode {
            code,
            code_verifier,
        };
        let response = self.post(endpoint, &request).await?;
        Self::tokens_from(response)
    }

    /// Obtain a fresh access token with a refresh token
    ///
    /// An empty `scopes` slice sends no `scope` parameter, which providers
    /// treat as "keep the originally granted scope". If the response carries
    /// no refresh token, the returned value has none either; whether the old
    /// one stays valid is provider-specific.
    ///
    /// # Errors
    ///
    /// Same as [`exchange_authorization_code`](Self::exchange_authorization_code);
    /// `InvalidGrant` means the refresh token is expired or revoked and the
    /// user must authorize again.
    pub async fn refresh_access_token<S: AsRef<str>>(
        &self,
        endpoint: &str,
        refresh_token: &str,
        scopes: &[S],
    ) -> AuthResult<OAuth2Tokens> {
        let request = TokenRequest::Refresh {
            refresh_token,
            scopes: scopes.iter().map(AsRef::as_ref).collect(),
        };
        let response = self.post(endpoint, &request).await?;
        Self::tokens_from(response)
    }

    /// Revoke an access or refresh token (RFC 7009)
    ///
    /// Revoking an already-invalid token succeeds whenever the provider
    /// answers with a 2xx status.
    ///
    /// # Errors
    ///
    /// - `RevocationFailed` on an explicit provider error
    /// - `Transport` on network failure or timeout
    pub async fn revoke_token(&self, endpoint: &str, token: &str) -> AuthResult<()> {
        let request = TokenRequest::Revocation { token };
        let response = self.post(endpoint, &request).await?;

        decode_revocation_response(response.status, response.content_type(), &response.body)
            .map_err(|err| {
                log_provider_error("revoke", &err);
                OAuthError::RevocationFailed(err)
            })?;

        tracing::debug!(status = response.status, "Token revoked");
        Ok(())
    }

    /// Send one request, bounded by the configured timeout
    async fn post(&self, endpoint: &str, request: &TokenRequest<'_>) -> AuthResult<HttpResponse> {
        let url = parse_endpoint(endpoint)?;
        let operation = request.grant_type().unwrap_or("revocation");

        let encoded = request.encode(&self.credentials, self.options.client_auth);
        let mut headers = encoded.headers;
        if let Some(user_agent) = &self.options.user_agent {
            headers.push(("User-Agent".to_string(), user_agent.clone()));
        }

        tracing::debug!(
            operation,
            host = url.host_str().unwrap_or_default(),
            "Sending token endpoint request"
        );

        let http_request = HttpRequest {
            method: Method::POST,
            url,
            headers,
            body: encoded.body.into_bytes(),
        };

        let timeout = self.options.timeout;
        let response = tokio::time::timeout(timeout, self.transport.send(http_request))
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
            .inspect_err(|e| tracing::warn!(operation, error = %e, "Token endpoint unreachable"))?;

        tracing::debug!(operation, status = response.status, "Token endpoint responded");
        Ok(response)
    }

    fn tokens_from(response: HttpResponse) -> AuthResult<OAuth2Tokens> {
        decode_token_response(response.status, response.content_type(), &response.body).map_err(
            |err| match err {
                DecodeError::Provider(err) => {
                    log_provider_error("token", &err);
                    OAuthError::token_exchange(err)
                }
                DecodeError::Malformed(msg) => {
                    tracing::warn!(status = response.status, "Malformed token response: {msg}");
                    OAuthError::MalformedResponse(msg)
                }
            },
        )
    }
}

fn log_provider_error(operation: &str, err: &ProviderError) {
    tracing::warn!(
        operation,
        status = err.status,
        code = %truncate_for_log(&err.code),
        description = err.description.as_deref().map(truncate_for_log),
        "Provider rejected request"
    );
}

/// Run `operation` unless `token` is cancelled first
///
/// On cancellation the in-flight request is dropped and nothing is retained.
///
/// # Errors
///
/// Returns `OAuthError::Cancelled` if the token fires before the operation
/// completes, otherwise the operation's own result.
///
/// # Example
/// ```no_run
/// use oauth2_codegrant::auth::{OAuth2Client, with_cancellation};
/// use oauth2_codegrant::types::ClientCredentials;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OAuth2Client::new(ClientCredentials::new("id", "secret", "https://app/cb"))?;
/// let cancel = CancellationToken::new();
/// let tokens = with_cancellation(
///     &cancel,
///     client.exchange_authorization_code("https://provider/token", "code", None),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_cancellation<T, F>(token: &CancellationToken, operation: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => {
            tracing::debug!("OAuth operation cancelled");
            Err(OAuthError::Cancelled)
        }
        result = operation => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use crate::types::ClientAuthStyle;
    use serde_json::json;
    use std::time::Duration;

    const TOKEN_URL: &str = "https://provider.example/oauth2/token";
    const REVOKE_URL: &str = "https://provider.example/oauth2/revoke";

    fn client_with(mock: &Arc<MockTransport>, options: ClientOptions) -> OAuth2Client {
        OAuth2Client::builder(ClientCredentials::new(
            "CID",
            "s3cret",
            "https://app.example/callback",
        ))
        .options(options)
        .transport(mock.clone())
        .build()
        .unwrap()
    }

    fn client(mock: &Arc<MockTransport>) -> OAuth2Client {
        client_with(mock, ClientOptions::default())
    }

    fn field<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn test_exchange_with_verifier_round_trip() {
        let mock = Arc::new(MockTransport::new());
        let body = json!({
            "access_token": "at",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "scope": "read",
            "id_token": "jwt",
            "x_vendor": {"tier": 2}
        });
        mock.respond_json(200, body.clone());

        let pkce = PkcePair::generate().unwrap();
        let tokens = client(&mock)
            .exchange_authorization_code(TOKEN_URL, "the-code", Some(pkce.verifier()))
            .await
            .unwrap();

        assert_eq!(serde_json::to_value(&tokens).unwrap(), body);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url.as_str(), TOKEN_URL);

        let form = mock.last_form();
        assert_eq!(field(&form, "grant_type"), Some("authorization_code"));
        assert_eq!(field(&form, "code"), Some("the-code"));
        assert_eq!(field(&form, "redirect_uri"), Some("https://app.example/callback"));
        assert_eq!(field(&form, "code_verifier"), Some(pkce.verifier()));
        assert_eq!(field(&form, "client_id"), Some("CID"));
        assert_eq!(field(&form, "client_secret"), Some("s3cret"));
    }

    #[tokio::test]
    async fn test_exchange_without_verifier_omits_parameter() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_json(200, json!({"access_token": "at", "token_type": "Bearer"}));

        client(&mock)
            .exchange_authorization_code(TOKEN_URL, "code", None)
            .await
            .unwrap();

        assert_eq!(field(&mock.last_form(), "code_verifier"), None);
    }

    #[tokio::test]
    async fn test_exchange_error_body_on_200_is_invalid_grant() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_json(
            200,
            json!({"error": "invalid_grant", "error_description": "expired"}),
        );

        let err = client(&mock)
            .exchange_authorization_code(TOKEN_URL, "code", None)
            .await
            .unwrap_err();

        let OAuthError::InvalidGrant(provider) = &err else {
            panic!("expected InvalidGrant, got {err:?}");
        };
        assert_eq!(provider.code, "invalid_grant");
        assert_eq!(provider.description.as_deref(), Some("expired"));
        assert!(err.requires_reauthentication());
    }

    #[tokio::test]
    async fn test_exchange_other_provider_error() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_json(
            401,
            json!({"error": "invalid_client", "error_description": "bad secret"}),
        );

        let err = client(&mock)
            .exchange_authorization_code(TOKEN_URL, "code", None)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::TokenExchangeFailed(ref e) if e.status == 401));
        assert!(!err.to_string().contains("s3cret"));
    }

    #[tokio::test]
    async fn test_exchange_malformed_response() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, "text/html", "<html>login</html>");

        let err = client(&mock)
            .exchange_authorization_code(TOKEN_URL, "code", None)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced_once() {
        let mock = Arc::new(MockTransport::new());
        mock.fail(TransportError::Connect("connection refused".into()));
        mock.respond_json(200, json!({"access_token": "at", "token_type": "Bearer"}));

        let err = client(&mock)
            .exchange_authorization_code(TOKEN_URL, "code", None)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::Transport(TransportError::Connect(_))));
        assert!(err.is_retriable());
        // No automatic retry
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_sends_nothing() {
        let mock = Arc::new(MockTransport::new());
        let err = client(&mock)
            .exchange_authorization_code("not-a-url", "code", None)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::InvalidEndpoint { .. }));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_empty_scopes_omits_scope() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_json(200, json!({"access_token": "at2", "token_type": "Bearer"}));
        mock.respond_json(200, json!({"access_token": "at3", "token_type": "Bearer"}));

        let client = client(&mock);
        let tokens = client
            .refresh_access_token::<&str>(TOKEN_URL, "rt", &[])
            .await
            .unwrap();
        let form = mock.last_form();
        assert_eq!(field(&form, "grant_type"), Some("refresh_token"));
        assert_eq!(field(&form, "refresh_token"), Some("rt"));
        assert_eq!(field(&form, "scope"), None);
        // Not carried over from the request
        assert_eq!(tokens.refresh_token(), None);

        client
            .refresh_access_token(TOKEN_URL, "rt", &[""])
            .await
            .unwrap();
        assert_eq!(field(&mock.last_form(), "scope"), Some(""));
    }

    #[tokio::test]
    async fn test_refresh_with_scopes() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_json(
            200,
            json!({"access_token": "at2", "token_type": "Bearer", "refresh_token": "rt2"}),
        );

        let scopes = vec!["read".to_string(), "write".to_string()];
        let tokens = client(&mock)
            .refresh_access_token(TOKEN_URL, "rt", &scopes)
            .await
            .unwrap();
        assert_eq!(field(&mock.last_form(), "scope"), Some("read write"));
        assert_eq!(tokens.refresh_token(), Some("rt2"));
    }

    #[tokio::test]
    async fn test_refresh_invalid_grant() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_json(400, json!({"error": "invalid_grant"}));

        let err = client(&mock)
            .refresh_access_token::<&str>(TOKEN_URL, "revoked", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::InvalidGrant(_)));
        assert_eq!(err.provider_error().map(|e| e.status), Some(400));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, "application/json", "");
        mock.respond(200, "application/json", "{}");

        let client = client(&mock);
        client.revoke_token(REVOKE_URL, "tok").await.unwrap();
        client.revoke_token(REVOKE_URL, "tok").await.unwrap();

        assert_eq!(mock.requests().len(), 2);
        let form = mock.last_form();
        assert_eq!(field(&form, "token"), Some("tok"));
        assert_eq!(field(&form, "grant_type"), None);
    }

    #[tokio::test]
    async fn test_revoke_provider_error() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_json(400, json!({"error": "unsupported_token_type"}));

        let err = client(&mock).revoke_token(REVOKE_URL, "tok").await.unwrap_err();
        assert!(matches!(err, OAuthError::RevocationFailed(ref e) if e.code == "unsupported_token_type"));
    }

    #[tokio::test]
    async fn test_basic_auth_and_user_agent() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, "", "");

        let options = ClientOptions::builder()
            .client_auth(ClientAuthStyle::BasicAuth)
            .user_agent("codegrant-test/1.0")
            .build();
        client_with(&mock, options)
            .revoke_token(REVOKE_URL, "tok")
            .await
            .unwrap();

        let request = &mock.requests()[0];
        let header = |name: &str| {
            request
                .headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        };
        assert_eq!(header("authorization").as_deref(), Some("Basic Q0lEOnMzY3JldA=="));
        assert_eq!(header("user-agent").as_deref(), Some("codegrant-test/1.0"));
        assert_eq!(field(&mock.last_form(), "client_secret"), None);
    }

    struct StalledTransport;

    #[async_trait::async_trait]
    impl HttpTransport for StalledTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(TransportError::Request("unreachable".into()))
        }
    }

    fn stalled_client(timeout: Duration) -> OAuth2Client {
        OAuth2Client::builder(ClientCredentials::new("CID", "s", "https://app.example/cb"))
            .options(ClientOptions::builder().timeout(timeout).build())
            .transport(Arc::new(StalledTransport))
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_request() {
        let client = stalled_client(Duration::from_secs(2));
        let err = client
            .exchange_authorization_code(TOKEN_URL, "code", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OAuthError::Transport(TransportError::Timeout(d)) if d == Duration::from_secs(2)
        ));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_request() {
        let client = stalled_client(Duration::from_secs(3600));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = with_cancellation(&cancel, client.revoke_token(REVOKE_URL, "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::Cancelled));
    }

    #[test]
    fn test_builder_validates_credentials() {
        let err = OAuth2Client::builder(ClientCredentials::new("CID", "s", "callback"))
            .transport(Arc::new(MockTransport::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, OAuthError::InvalidConfig(_)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let mock = Arc::new(MockTransport::new());
        let debug = format!("{:?}", client(&mock));
        assert!(debug.contains("CID"));
        assert!(!debug.contains("s3cret"));
    }
}
