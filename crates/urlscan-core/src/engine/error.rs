//! Engine call error type, classified before it reaches the orchestrator.

use crate::retry::TransportKind;
use std::fmt;

/// Error returned by a single engine request.
#[derive(Debug)]
pub enum EngineError {
    /// Engine answered with a non-success HTTP status.
    Rejected { status: u16, body: String },
    /// The request never got an HTTP answer (DNS, connect, timeout, ...).
    Transport { kind: TransportKind, message: String },
    /// Success status, but the body was not what the engine API promises.
    MalformedResponse(String),
}

impl EngineError {
    pub(crate) fn from_curl(e: curl::Error) -> Self {
        EngineError::Transport {
            kind: crate::retry::classify_curl_error(&e),
            message: e.to_string(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Rejected { status, body } => write!(f, "HTTP {}: {}", status, body),
            EngineError::Transport { kind, message } => write!(f, "{} error: {}", kind, message),
            EngineError::MalformedResponse(detail) => write!(f, "malformed response: {}", detail),
        }
    }
}

impl std::error::Error for EngineError {}
