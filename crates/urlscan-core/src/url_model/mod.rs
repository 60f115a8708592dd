//! URL modeling: normalization and request validation.
//!
//! The normalized form is what gets submitted to the scan engine and what is
//! echoed back to the caller, so it must be stable for a given input.

mod normalize;
mod request;

pub use normalize::{normalize_url, NormalizedUrl};
pub use request::ScanRequest;

use thiserror::Error;

/// Reasons a raw URL cannot be scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,
    #[error("URL has no scheme: {0}")]
    MissingScheme(String),
    #[error("URL has no host: {0}")]
    MissingHost(String),
    #[error("unsupported URL scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },
    #[error("malformed URL: {0}")]
    Malformed(String),
}
