//! Front-end validation of a URL before it reaches the orchestrator.

use super::{normalize_url, NormalizedUrl, UrlError};

/// A validated scan request: an absolute http(s) URL with a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    raw: String,
    normalized: NormalizedUrl,
}

impl ScanRequest {
    /// Validates `raw` as an absolute `http`/`https` URL and normalizes it.
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UrlError::Empty);
        }
        let parsed = url::Url::parse(trimmed).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => {
                UrlError::MissingScheme(trimmed.to_string())
            }
            url::ParseError::EmptyHost => UrlError::MissingHost(trimmed.to_string()),
            other => UrlError::Malformed(format!("{trimmed}: {other}")),
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(UrlError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingHost(trimmed.to_string()));
        }

        let normalized = normalize_url(trimmed)?;
        Ok(Self {
            raw: trimmed.to_string(),
            normalized,
        })
    }

    /// The input as given (trimmed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &NormalizedUrl {
        &self.normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        let r = ScanRequest::parse("https://Example.com/a?b=c").unwrap();
        assert_eq!(r.normalized().as_str(), "https://Example.com/a");
        assert_eq!(r.raw(), "https://Example.com/a?b=c");
        assert!(ScanRequest::parse("http://example.com").is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            ScanRequest::parse("ftp://example.com/file"),
            Err(UrlError::UnsupportedScheme {
                scheme: "ftp".to_string()
            })
        );
    }

    #[test]
    fn rejects_relative_and_hostless() {
        assert!(matches!(
            ScanRequest::parse("/just/a/path"),
            Err(UrlError::MissingScheme(_))
        ));
        assert!(matches!(
            ScanRequest::parse("example.com"),
            Err(UrlError::MissingScheme(_))
        ));
        assert!(ScanRequest::parse("http://").is_err());
        assert_eq!(ScanRequest::parse(""), Err(UrlError::Empty));
    }
}
