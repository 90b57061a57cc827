//! Interactive OAuth login
//!
//! Walks through the Authorization Code grant against one of the provider
//! presets:
//!
//! 1. Prints the authorization URL (with PKCE when the provider takes it)
//! 2. Reads the redirect URL (or bare code) pasted from the browser
//! 3. Checks `state` (input without one is refused unless
//!    `--skip-state-check` is given), exchanges the code and prints the
//!    token summary
//! 4. Optionally refreshes and revokes
//!
//! Credentials come from `<PREFIX>_CLIENT_ID`, `<PREFIX>_CLIENT_SECRET` and
//! `<PREFIX>_REDIRECT_URI`, where the prefix defaults to the provider name.
//!
//! ```bash
//! POLAR_CLIENT_ID=... POLAR_CLIENT_SECRET=... POLAR_REDIRECT_URI=... \
//!     cargo run -p oauth-login -- --provider polar --scope openid --scope email
//! ```

mod input;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use console::style;
use oauth2_codegrant::providers::{self, PkceRequirement, Provider};
use oauth2_codegrant::{ClientCredentials, OAuth2Tokens, PkcePair, generate_state, with_cancellation};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProviderKind {
    Discord,
    EpicGames,
    Polar,
}

impl ProviderKind {
    fn env_prefix(self) -> &'static str {
        match self {
            Self::Discord => "DISCORD",
            Self::EpicGames => "EPIC_GAMES",
            Self::Polar => "POLAR",
        }
    }

    fn connect(self, credentials: ClientCredentials) -> oauth2_codegrant::AuthResult<Provider> {
        match self {
            Self::Discord => providers::discord(credentials),
            Self::EpicGames => providers::epic_games(credentials),
            Self::Polar => providers::polar(credentials),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "oauth-login")]
#[command(about = "Log in with the OAuth 2.0 Authorization Code grant")]
struct Args {
    /// Provider preset
    #[arg(long, short = 'p', value_enum)]
    provider: ProviderKind,

    /// Requested scope (repeatable)
    #[arg(long = "scope", short = 's')]
    scopes: Vec<String>,

    /// Environment variable prefix for client credentials
    #[arg(long)]
    env_prefix: Option<String>,

    /// Refresh the access token after login
    #[arg(long)]
    refresh: bool,

    /// Revoke the access token before exiting
    #[arg(long)]
    revoke: bool,

    /// Exchange a code even when the pasted input carries no `state`
    #[arg(long)]
    skip_state_check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let prefix = args
        .env_prefix
        .clone()
        .unwrap_or_else(|| args.provider.env_prefix().to_string());

    let credentials = ClientCredentials::from_env(&prefix)
        .with_context(|| format!("set {prefix}_CLIENT_ID and {prefix}_REDIRECT_URI"))?;
    let provider = args.provider.connect(credentials)?;

    println!("{}", style(format!("Logging in with {}", provider.name())).bold());

    let state = generate_state()?;
    let pkce = match provider.config().pkce {
        PkceRequirement::Unsupported => None,
        PkceRequirement::Optional | PkceRequirement::Required => Some(PkcePair::generate()?),
    };

    let url = provider.authorization_url(&state, &args.scopes, pkce.as_ref())?;
    println!("\nOpen this URL in your browser:\n\n  {}\n", style(url).cyan());

    let callback = input::prompt_for_callback()?;
    input::check_state(&state, callback.state.as_deref(), args.skip_state_check)?;
    if callback.state.is_none() {
        println!("{}", style("No state in input; state check skipped").yellow());
    }

    // Ctrl+C aborts the in-flight request
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    tracing::info!(provider = provider.name(), pkce = pkce.is_some(), "Exchanging authorization code");
    let tokens = with_cancellation(
        &cancel,
        provider.validate_authorization_code(
            &callback.code,
            pkce.as_ref().map(PkcePair::verifier),
        ),
    )
    .await?;
    print_tokens("Access granted", &tokens);

    let tokens = if args.refresh {
        let Some(refresh_token) = tokens.refresh_token() else {
            bail!("{} issued no refresh token", provider.name());
        };
        tracing::info!(provider = provider.name(), "Refreshing access token");
        let refreshed = with_cancellation(
            &cancel,
            provider.refresh_access_token(refresh_token, &args.scopes),
        )
        .await?;
        print_tokens("Refreshed", &refreshed);
        refreshed
    } else {
        tokens
    };

    if args.revoke {
        with_cancellation(&cancel, provider.revoke_token(tokens.access_token())).await?;
        println!("{}", style("Access token revoked").green());
    }

    Ok(())
}

fn print_tokens(title: &str, tokens: &OAuth2Tokens) {
    println!("\n{}", style(title).green().bold());
    println!("  token type:    {}", tokens.token_type());
    println!("  access token:  {}", input::preview(tokens.access_token()));
    match tokens.expires_in() {
        Some(seconds) => println!("  expires in:    {seconds}s"),
        None => println!("  expires in:    (not reported)"),
    }
    println!("  refresh token: {}", if tokens.has_refresh_token() { "yes" } else { "no" });
    if let Some(scope) = tokens.scope() {
        println!("  scope:         {scope}");
    }
}
