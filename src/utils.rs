//! Encoding and redaction helpers shared by the OAuth modules

use std::fmt::Write;

/// Placeholder printed instead of secrets in `Debug` output
pub(crate) const REDACTED: &str = "[redacted]";

/// Maximum bytes of provider-supplied text copied into log events
const MAX_LOGGED_TEXT: usize = 256;

/// Percent-encode a string for an OAuth query parameter.
///
/// Preserves unreserved characters per RFC 3986 and encodes everything else,
/// so a space becomes `%20` rather than `+`.
///
/// # Example
/// ```
/// use oauth2_codegrant::utils::percent_encode;
///
/// assert_eq!(percent_encode("read write"), "read%20write");
/// assert_eq!(percent_encode("a-b_c.d~e"), "a-b_c.d~e");
/// ```
#[must_use]
pub fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                // Writing to a String cannot fail
                let _ = write!(result, "%{byte:02X}");
            }
        }
    }
    result
}

/// Join scopes with single spaces, keeping caller order.
///
/// Returns `None` for an empty list so callers can omit the parameter
/// entirely. A list holding one empty string joins to `Some("")`.
#[must_use]
pub fn join_scopes<S: AsRef<str>>(scopes: &[S]) -> Option<String> {
    if scopes.is_empty() {
        return None;
    }
    let joined = scopes
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    Some(joined)
}

/// Truncate provider text at a UTF-8 boundary before it reaches a log line.
#[must_use]
pub(crate) fn truncate_for_log(s: &str) -> &str {
    if s.len() <= MAX_LOGGED_TEXT {
        return s;
    }

    let mut boundary = MAX_LOGGED_TEXT;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    &s[..boundary]
}
