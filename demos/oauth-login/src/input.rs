//! Reading the authorization response from the terminal

use std::io::{BufRead, Write};
use url::Url;

/// Code and state pasted back by the user
#[derive(Debug, PartialEq)]
pub struct Callback {
    pub code: String,
    pub state: Option<String>,
}

/// Ask for the redirect URL, a `code#state` pair, or a bare code
pub fn prompt_for_callback() -> anyhow::Result<Callback> {
    print!("Paste the redirect URL or authorization code: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    parse_callback(input.trim())
}

fn parse_callback(input: &str) -> anyhow::Result<Callback> {
    if input.is_empty() {
        anyhow::bail!("no authorization code entered");
    }

    if let Ok(url) = Url::parse(input) {
        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => anyhow::bail!("authorization denied: {value}"),
                _ => {}
            }
        }
        let code = code.ok_or_else(|| anyhow::anyhow!("redirect URL has no code parameter"))?;
        return Ok(Callback { code, state });
    }

    // Some providers display "code#state" on their callback page
    Ok(match input.split_once('#') {
        Some((code, state)) => Callback {
            code: code.to_string(),
            state: Some(state.to_string()),
        },
        None => Callback {
            code: input.to_string(),
            state: None,
        },
    })
}

/// Compare the returned `state` with the one sent
///
/// A mismatch always fails. Missing state fails unless `skip_missing` is set.
pub fn check_state(expected: &str, returned: Option<&str>, skip_missing: bool) -> anyhow::Result<()> {
    match returned {
        Some(returned) if returned == expected => Ok(()),
        Some(_) => anyhow::bail!("state mismatch; discarding the code"),
        None if skip_missing => Ok(()),
        None => anyhow::bail!(
            "no state in input; paste the full redirect URL or pass --skip-state-check"
        ),
    }
}

/// First few characters of a token, for display
pub fn preview(token: &str) -> String {
    let head: String = token.chars().take(8).collect();
    format!("{head}... ({} chars)", token.chars().count())
}
