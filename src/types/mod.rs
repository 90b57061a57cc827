//! Type definitions shared by the client and provider presets
//!
//! This module holds the registered client identity and the per-client
//! options applied to every token endpoint request.

pub mod credentials;
pub mod options;

pub use credentials::ClientCredentials;
pub use options::{ClientAuthStyle, ClientOptions, ClientOptionsBuilder, DEFAULT_TIMEOUT};
