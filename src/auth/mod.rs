//! OAuth 2.0 Authorization Code grant with PKCE
//!
//! # Overview
//!
//! The flow works as follows:
//!
//! 1. Generate a `state` value and, if the provider uses PKCE, a verifier/challenge pair
//! 2. Send the user to the authorization URL
//! 3. Receive `code` and `state` on the redirect; compare `state` yourself
//! 4. Exchange the code (plus verifier) for tokens
//! 5. Refresh or revoke tokens later as needed
//!
//! # Example
//!
//! ```no_run
//! use oauth2_codegrant::auth::{OAuth2Client, generate_state, generate_verifier};
//! use oauth2_codegrant::types::ClientCredentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OAuth2Client::new(ClientCredentials::new(
//!         "client-id",
//!         "client-secret",
//!         "https://app.example/callback",
//!     ))?;
//!
//!     let state = generate_state()?;
//!     let pkce = generate_verifier()?;
//!     let url = client.authorization_url(
//!         "https://provider.example/authorize",
//!         &state,
//!         &["profile"],
//!         Some(&pkce),
//!     )?;
//!     println!("Open {url}");
//!
//!     // ... redirect arrives with ?code=...&state=...
//!     let tokens = client
//!         .exchange_authorization_code(
//!             "https://provider.example/token",
//!             "code-from-redirect",
//!             Some(pkce.verifier()),
//!         )
//!         .await?;
//!     println!("Expires in: {:?}", tokens.expires_in());
//!     Ok(())
//! }
//! ```
//!
//! # Security
//!
//! - PKCE prevents authorization code interception attacks
//! - Client secrets and tokens are redacted from `Debug` output and never logged
//! - Nothing is stored: tokens and verifiers are owned by the caller

mod authorization;
pub mod codec;
mod oauth;
mod pkce;
mod token;

pub use authorization::build_authorization_url;
pub(crate) use authorization::parse_endpoint;
pub use codec::{DecodeError, EncodedRequest, TokenRequest};
pub use oauth::{OAuth2Client, OAuth2ClientBuilder, with_cancellation};
pub use pkce::{
    CodeChallengeMethod, MAX_VERIFIER_LEN, MIN_VERIFIER_LEN, PkcePair, derive_challenge,
    generate_state, generate_verifier,
};
pub use token::OAuth2Tokens;
