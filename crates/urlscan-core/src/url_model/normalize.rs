//! Canonical `scheme://authority/path` form.

use super::UrlError;
use serde::{Serialize, Serializer};
use std::fmt;

/// A URL reduced to scheme, authority and path.
///
/// Query string, fragment, `;params` of the last path segment and surrounding
/// whitespace are gone. The scheme is lower-cased; the authority is kept
/// exactly as given (case, userinfo, port).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for NormalizedUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Normalizes `raw` into `scheme://authority{path}`.
///
/// Splits the URL the way a generic URI splitter does (no percent-decoding,
/// no host case folding), drops `?query`, `#fragment` and the `;params` of the
/// last path segment, and rejects input without a scheme or authority. ASCII
/// tab, CR and LF are removed wherever they appear. Deterministic and
/// side-effect free.
///
/// # Examples
///
/// - `" HTTP://Example.com/path?x=1#frag "` → `"http://Example.com/path"`
/// - `"https://example.com"` → `"https://example.com"`
/// - `"http://a.com/b;type=a?x"` → `"http://a.com/b"`
pub fn normalize_url(raw: &str) -> Result<NormalizedUrl, UrlError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let (scheme, rest) =
        split_scheme(trimmed).ok_or_else(|| UrlError::MissingScheme(trimmed.to_string()))?;

    let after_slashes = rest
        .strip_prefix("//")
        .ok_or_else(|| UrlError::MissingHost(trimmed.to_string()))?;

    let authority_end = after_slashes
        .find(&['/', '?', '#'][..])
        .unwrap_or(after_slashes.len());
    let authority = &after_slashes[..authority_end];
    if authority.is_empty() {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    let tail = &after_slashes[authority_end..];
    let path_end = tail.find(&['?', '#'][..]).unwrap_or(tail.len());
    let path = strip_params(&tail[..path_end]);

    Ok(NormalizedUrl(format!(
        "{}://{}{}",
        scheme.to_ascii_lowercase(),
        authority,
        path
    )))
}

/// Cuts `;params` off the last path segment; earlier segments keep theirs.
fn strip_params(path: &str) -> &str {
    let last = path.rfind('/').unwrap_or(0);
    match path[last..].find(';') {
        Some(i) => &path[..last + i],
        None => path,
    }
}

/// Splits off a leading `scheme:` (ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )).
fn split_scheme(s: &str) -> Option<(&str, &str)> {
    let colon = s.find(':')?;
    let scheme = &s[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some((scheme, &s[colon + 1..]))
}
