//! PKCE (RFC 7636) code verifier and challenge generation

use crate::error::{AuthResult, OAuthError};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
use std::fmt;

/// Minimum verifier length allowed by RFC 7636
pub const MIN_VERIFIER_LEN: usize = 43;
/// Maximum verifier length allowed by RFC 7636
pub const MAX_VERIFIER_LEN: usize = 128;
/// Random bytes behind a default verifier (86 characters once encoded)
const DEFAULT_VERIFIER_BYTES: usize = 64;
/// Random bytes behind a generated `state` value
const STATE_BYTES: usize = 32;

/// How the code challenge is derived from the verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeChallengeMethod {
    /// Challenge equals the verifier
    Plain,
    /// Challenge is `BASE64URL(SHA256(verifier))`
    #[default]
    S256,
}

impl CodeChallengeMethod {
    /// Value of the `code_challenge_method` parameter
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }
}

impl fmt::Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PKCE verifier together with its derived challenge
///
/// The caller keeps the pair (typically in a short-lived session) between
/// building the authorization URL and exchanging the code.
#[derive(Clone, PartialEq, Eq)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
    method: CodeChallengeMethod,
}

impl PkcePair {
    /// Generate an S256 pair with the default verifier length
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::CryptoUnavailable` if the OS random source fails.
    pub fn generate() -> AuthResult<Self> {
        let verifier = URL_SAFE_NO_PAD.encode(random_bytes(DEFAULT_VERIFIER_BYTES)?);
        Ok(Self::derive(verifier, CodeChallengeMethod::S256))
    }

    /// Generate a pair whose verifier has exactly `length` characters
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::InvalidCodeVerifier` if `length` is outside
    /// 43..=128, or `OAuthError::CryptoUnavailable` if randomness fails.
    pub fn generate_with(method: CodeChallengeMethod, length: usize) -> AuthResult<Self> {
        if !(MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN).contains(&length) {
            return Err(OAuthError::InvalidCodeVerifier(format!(
                "length {length} outside {MIN_VERIFIER_LEN}..={MAX_VERIFIER_LEN}"
            )));
        }
        // Every 3 bytes encode to 4 characters; round up, then trim
        let mut verifier = URL_SAFE_NO_PAD.encode(random_bytes(length.div_ceil(4) * 3)?);
        verifier.truncate(length);
        Ok(Self::derive(verifier, method))
    }

    /// Rebuild a pair from a verifier the caller retained
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::InvalidCodeVerifier` if the verifier breaks the
    /// RFC 7636 length or character rules.
    pub fn from_verifier(verifier: impl Into<String>, method: CodeChallengeMethod) -> AuthResult<Self> {
        let verifier = verifier.into();
        validate_verifier(&verifier)?;
        Ok(Self::derive(verifier, method))
    }

    fn derive(verifier: String, method: CodeChallengeMethod) -> Self {
        let challenge = derive_challenge(&verifier, method);
        Self {
            verifier,
            challenge,
            method,
        }
    }

    /// Code verifier, sent with the token request
    #[must_use]
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// Code challenge, sent with the authorization request
    #[must_use]
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// Challenge derivation method
    #[must_use]
    pub fn method(&self) -> CodeChallengeMethod {
        self.method
    }
}

impl fmt::Debug for PkcePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkcePair")
            .field("verifier", &crate::utils::REDACTED)
            .field("challenge", &self.challenge)
            .field("method", &self.method)
            .finish()
    }
}

/// Generate a fresh S256 PKCE pair
///
/// # Errors
///
/// Returns `OAuthError::CryptoUnavailable` if the OS random source fails.
pub fn generate_verifier() -> AuthResult<PkcePair> {
    PkcePair::generate()
}

/// Derive the code challenge for `verifier`
///
/// Pure and deterministic: the same verifier always yields the same challenge.
#[must_use]
pub fn derive_challenge(verifier: &str, method: CodeChallengeMethod) -> String {
    match method {
        CodeChallengeMethod::Plain => verifier.to_string(),
        CodeChallengeMethod::S256 => URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())),
    }
}

/// Generate an opaque `state` value for CSRF protection
///
/// # Errors
///
/// Returns `OAuthError::CryptoUnavailable` if the OS random source fails.
pub fn generate_state() -> AuthResult<String> {
    Ok(URL_SAFE_NO_PAD.encode(random_bytes(STATE_BYTES)?))
}

fn validate_verifier(verifier: &str) -> AuthResult<()> {
    let len = verifier.len();
    if !(MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN).contains(&len) {
        return Err(OAuthError::InvalidCodeVerifier(format!(
            "length {len} outside {MIN_VERIFIER_LEN}..={MAX_VERIFIER_LEN}"
        )));
    }
    if let Some(c) = verifier
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')))
    {
        return Err(OAuthError::InvalidCodeVerifier(format!(
            "character {c:?} is not unreserved"
        )));
    }
    Ok(())
}

fn random_bytes(len: usize) -> AuthResult<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    getrandom::getrandom(&mut bytes).map_err(|e| OAuthError::CryptoUnavailable(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unreserved(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
    }

    #[test]
    fn test_generate_defaults() {
        let pkce = generate_verifier().unwrap();
        assert_eq!(pkce.method(), CodeChallengeMethod::S256);
        assert_eq!(pkce.verifier().len(), 86);
        // SHA-256 digest is 32 bytes -> 43 base64url chars
        assert_eq!(pkce.challenge().len(), 43);
        assert!(is_unreserved(pkce.verifier()));
        assert!(is_unreserved(pkce.challenge()));
    }

    #[test]
    fn test_generated_pairs_are_unique() {
        let a = PkcePair::generate().unwrap();
        let b = PkcePair::generate().unwrap();
        assert_ne!(a.verifier(), b.verifier());
        assert_ne!(a.challenge(), b.challenge());
    }

    #[test]
    fn test_generate_with_exact_lengths() {
        for length in [MIN_VERIFIER_LEN, 64, 100, MAX_VERIFIER_LEN] {
            let pkce = PkcePair::generate_with(CodeChallengeMethod::S256, length).unwrap();
            assert_eq!(pkce.verifier().len(), length);
            assert!(is_unreserved(pkce.verifier()));
        }

        assert!(matches!(
            PkcePair::generate_with(CodeChallengeMethod::S256, 42),
            Err(OAuthError::InvalidCodeVerifier(_))
        ));
        assert!(matches!(
            PkcePair::generate_with(CodeChallengeMethod::S256, 129),
            Err(OAuthError::InvalidCodeVerifier(_))
        ));
    }

    #[test]
    fn test_s256_matches_rfc7636_appendix_b() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = derive_challenge(verifier, CodeChallengeMethod::S256);
        assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
        // Deterministic
        assert_eq!(derive_challenge(verifier, CodeChallengeMethod::S256), challenge);
    }

    #[test]
    fn test_plain_challenge_is_verifier() {
        let pkce = PkcePair::generate_with(CodeChallengeMethod::Plain, 50).unwrap();
        assert_eq!(pkce.challenge(), pkce.verifier());
    }

    #[test]
    fn test_from_verifier_validates() {
        let ok = PkcePair::from_verifier("a".repeat(43), CodeChallengeMethod::S256).unwrap();
        assert_eq!(ok.verifier().len(), 43);

        assert!(PkcePair::from_verifier("short", CodeChallengeMethod::S256).is_err());
        assert!(PkcePair::from_verifier("a".repeat(129), CodeChallengeMethod::S256).is_err());
        let bad_char = format!("{}+", "a".repeat(50));
        assert!(matches!(
            PkcePair::from_verifier(bad_char, CodeChallengeMethod::S256),
            Err(OAuthError::InvalidCodeVerifier(_))
        ));
    }

    #[test]
    fn test_debug_hides_verifier() {
        let pkce = PkcePair::generate().unwrap();
        let debug = format!("{pkce:?}");
        assert!(!debug.contains(pkce.verifier()));
        assert!(debug.contains(pkce.challenge()));
    }

    #[test]
    fn test_generate_state() {
        let state = generate_state().unwrap();
        assert_eq!(state.len(), 43);
        assert_ne!(state, generate_state().unwrap());
    }
}
