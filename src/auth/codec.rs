//! Token endpoint wire format
//!
//! Encodes code-exchange, refresh and revocation requests as
//! `application/x-www-form-urlencoded` bodies and interprets the provider's
//! reply, including RFC 6749 §5.2 error bodies.

use super::token::OAuth2Tokens;
use crate::error::ProviderError;
use crate::types::{ClientAuthStyle, ClientCredentials};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};
use url::form_urlencoded;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request sent to a token or revocation endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRequest<'a> {
    /// Exchange an authorization code (RFC 6749 §4.1.3)
    AuthorizationCode {
        /// Code received on the redirect
        code: &'a str,
        /// PKCE verifier, exactly when the authorization URL carried a challenge
        code_verifier: Option<&'a str>,
    },
    /// Obtain a new access token (RFC 6749 §6)
    Refresh {
        /// Refresh token from an earlier response
        refresh_token: &'a str,
        /// Requested scopes; empty means the parameter is not sent
        scopes: Vec<&'a str>,
    },
    /// Revoke a token (RFC 7009)
    Revocation {
        /// Access or refresh token to revoke
        token: &'a str,
    },
}

/// Headers and body ready to POST
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedRequest {
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Form-encoded body
    pub body: String,
}

impl std::fmt::Debug for EncodedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Body and Authorization header both carry secrets
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("EncodedRequest")
            .field("headers", &header_names)
            .field("body_len", &self.body.len())
            .finish()
    }
}

impl TokenRequest<'_> {
    /// Value of `grant_type`, or `None` for revocation
    #[must_use]
    pub fn grant_type(&self) -> Option<&'static str> {
        match self {
            Self::AuthorizationCode { .. } => Some("authorization_code"),
            Self::Refresh { .. } => Some("refresh_token"),
            Self::Revocation { .. } => None,
        }
    }

    /// Serialize into headers and a form body
    #[must_use]
    pub fn encode(&self, credentials: &ClientCredentials, style: ClientAuthStyle) -> EncodedRequest {
        let mut form = form_urlencoded::Serializer::new(String::new());

        match self {
            Self::AuthorizationCode {
                code,
                code_verifier,
            } => {
                form.append_pair("grant_type", "authorization_code");
                form.append_pair("code", code);
                form.append_pair("redirect_uri", credentials.redirect_uri());
                if let Some(verifier) = code_verifier {
                    form.append_pair("code_verifier", verifier);
                }
            }
            Self::Refresh {
                refresh_token,
                scopes,
            } => {
                form.append_pair("grant_type", "refresh_token");
                form.append_pair("refresh_token", refresh_token);
                if let Some(scope) = crate::utils::join_scopes(scopes.as_slice()) {
                    form.append_pair("scope", &scope);
                }
            }
            Self::Revocation { token } => {
                form.append_pair("token", token);
            }
        }

        let mut headers = vec![
            ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];

        match (style, credentials.client_secret()) {
            (ClientAuthStyle::BasicAuth, Some(secret)) => {
                let pair = format!("{}:{secret}", credentials.client_id());
                headers.push((
                    "Authorization".to_string(),
                    format!("Basic {}", STANDARD.encode(pair)),
                ));
            }
            (ClientAuthStyle::RequestBody, Some(secret)) => {
                form.append_pair("client_id", credentials.client_id());
                form.append_pair("client_secret", secret);
            }
            // Public clients identify themselves in the body
            (_, None) => {
                form.append_pair("client_id", credentials.client_id());
            }
        }

        EncodedRequest {
            headers,
            body: form.finish(),
        }
    }
}

/// Why a response could not be turned into a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Provider reported an error
    Provider(ProviderError),
    /// Body did not follow the protocol
    Malformed(String),
}

/// Interpret a token endpoint response
///
/// Non-2xx statuses and 2xx bodies with an `error` field are provider errors;
/// anything else must decode into [`OAuth2Tokens`].
///
/// # Errors
///
/// Returns `DecodeError::Provider` for provider rejections and
/// `DecodeError::Malformed` for undecodable success bodies.
pub fn decode_token_response(
    status: u16,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<OAuth2Tokens, DecodeError> {
    if !is_success(status) {
        return Err(DecodeError::Provider(failure_from_body(status, content_type, body)));
    }

    let fields = parse_body(content_type, body)?;
    if let Some(err) = provider_error(status, &fields) {
        return Err(DecodeError::Provider(err));
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| DecodeError::Malformed(format!("invalid token response: {e}")))
}

/// Interpret a revocation endpoint response
///
/// Any 2xx without an explicit `error` field counts as success; the body is
/// otherwise ignored, so there is no malformed case.
///
/// # Errors
///
/// Returns the provider's error for a failure status or an `error` field.
pub fn decode_revocation_response(
    status: u16,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<(), ProviderError> {
    if !is_success(status) {
        return Err(failure_from_body(status, content_type, body));
    }

    // Acknowledgment bodies vary (empty, "OK", {}); only an error object matters
    match parse_body(content_type, body) {
        Ok(fields) => provider_error(status, &fields).map_or(Ok(()), Err),
        Err(_) => Ok(()),
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn is_form(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        ct.split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
    })
}

fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    if is_form(content_type) {
        return Ok(form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(DecodeError::Malformed(
            "response body is not a JSON object".to_string(),
        )),
        Err(e) => Err(DecodeError::Malformed(format!(
            "response body is not valid JSON: {e}"
        ))),
    }
}

fn provider_error(status: u16, fields: &Map<String, Value>) -> Option<ProviderError> {
    let code = match fields.get("error")? {
        Value::String(code) => code.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };
    let text = |name: &str| fields.get(name).and_then(Value::as_str).map(str::to_string);

    Some(ProviderError {
        code,
        description: text("error_description"),
        uri: text("error_uri"),
        status,
    })
}

fn failure_from_body(status: u16, content_type: Option<&str>, body: &[u8]) -> ProviderError {
    parse_body(content_type, body)
        .ok()
        .and_then(|fields| provider_error(status, &fields))
        .unwrap_or_else(|| ProviderError::unexpected_status(status))
}
