//! # OAuth 2.0 Authorization Code client for Rust
//!
//! Client-side engine for the OAuth 2.0 Authorization Code grant with PKCE.
//! Async/await, strong typing, tokio-based.
//!
//! ## Quick Start
//!
//! ```no_run
//! use oauth2_codegrant::{ClientCredentials, PkcePair, generate_state, providers};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let polar = providers::polar(ClientCredentials::from_env("POLAR")?)?;
//!
//!     let state = generate_state()?;
//!     let pkce = PkcePair::generate()?;
//!     let url = polar.authorization_url(&state, &["openid", "email"], Some(&pkce))?;
//!     println!("Visit: {url}");
//!
//!     // ... the redirect delivers ?code=...&state=...; compare `state` first
//!     let tokens = polar
//!         .validate_authorization_code("code-from-redirect", Some(pkce.verifier()))
//!         .await?;
//!     println!("Token type: {}", tokens.token_type());
//!     Ok(())
//! }
//! ```
//!
//! ## Core Features
//!
//! ### 1. Generic client with [`OAuth2Client`]
//!
//! Works against any compliant provider. Endpoints are passed per call:
//!
//! ```no_run
//! # use oauth2_codegrant::{ClientAuthStyle, ClientCredentials, ClientOptions, OAuth2Client};
//! # use std::time::Duration;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ClientOptions::builder()
//!     .timeout(Duration::from_secs(10))
//!     .client_auth(ClientAuthStyle::BasicAuth)
//!     .build();
//!
//! let client = OAuth2Client::builder(ClientCredentials::new(
//!     "client-id",
//!     "client-secret",
//!     "https://app.example/callback",
//! ))
//! .options(options)
//! .build()?;
//!
//! let tokens = client
//!     .refresh_access_token("https://provider.example/token", "refresh-token", &["read"])
//!     .await?;
//! client
//!     .revoke_token("https://provider.example/revoke", tokens.access_token())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. Provider presets in [`providers`]
//!
//! Discord, Epic Games and Polar ship as [`ProviderConfig`] values that carry
//! endpoints, PKCE requirements and client authentication style.
//!
//! ### 3. Pluggable transport
//!
//! [`transport::HttpTransport`] is the single seam for network I/O.
//! [`ReqwestTransport`] is the default; tests and embedders can supply their own.
//!
//! ## Architecture
//!
//! - [`auth`]: PKCE, authorization URLs, token request codec and the client
//! - [`providers`]: Provider configuration and presets
//! - [`transport`]: HTTP transport abstraction
//! - [`types`]: Credentials and client options
//! - [`error`]: Error types and handling
//! - [`utils`]: Percent-encoding and scope helpers
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Tracing events are always emitted but are zero-cost when no subscriber is attached.
//! Secrets, codes, verifiers and tokens never appear in log output.
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`AuthResult<T>`]:
//!
//! ```no_run
//! # use oauth2_codegrant::{OAuth2Client, OAuthError};
//! # async fn example(client: OAuth2Client) {
//! match client
//!     .refresh_access_token::<&str>("https://provider.example/token", "stale", &[])
//!     .await
//! {
//!     Ok(tokens) => { /* ... */ }
//!     Err(OAuthError::InvalidGrant(err)) => {
//!         eprintln!("Sign in again: {err}");
//!     }
//!     Err(e) => {
//!         eprintln!("Error: {e}");
//!     }
//! }
//! # }
//! ```
//!
//! ## Security
//!
//! - **No storage** - tokens, verifiers and state belong to the caller
//! - **No retries** - authorization codes are single-use, so failed requests are surfaced as-is
//! - **Redirects disabled** - the default transport never follows token endpoint redirects
//! - **Redacted `Debug`** - secrets and tokens print as `[redacted]`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod error;
pub mod providers;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use auth::{
    CodeChallengeMethod, OAuth2Client, OAuth2ClientBuilder, OAuth2Tokens, PkcePair,
    build_authorization_url, generate_state, generate_verifier, with_cancellation,
};
pub use error::{AuthResult, OAuthError, ProviderError, TransportError};
pub use providers::{PkceRequirement, Provider, ProviderConfig, RefreshScopes};
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{ClientAuthStyle, ClientCredentials, ClientOptions};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
