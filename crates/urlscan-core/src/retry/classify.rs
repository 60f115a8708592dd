//! Classify HTTP status and curl errors coming back from the scan engine.

use std::fmt;

/// Why the engine refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Engine asked us to slow down (429, 503).
    Throttled,
    /// Engine-side failure (other 5xx).
    Upstream(u16),
    /// The request itself was refused (bad key, bad input, ...).
    Client,
}

impl RejectionKind {
    /// Whether repeating the same request later may succeed.
    pub fn is_transient(self) -> bool {
        !matches!(self, RejectionKind::Client)
    }
}

/// Network-level fault reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Connect or transfer timed out.
    Timeout,
    /// DNS, refused connection, reset, empty reply.
    Connection,
    /// Anything else libcurl reported (TLS, protocol, ...).
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Timeout => write!(f, "timeout"),
            TransportKind::Connection => write!(f, "connection"),
            TransportKind::Other => write!(f, "transport"),
        }
    }
}

/// Classify a non-success HTTP status from the engine.
pub fn classify_http_status(code: u16) -> RejectionKind {
    match code {
        429 | 503 => RejectionKind::Throttled,
        500..=599 => RejectionKind::Upstream(code),
        _ => RejectionKind::Client,
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> TransportKind {
    if e.is_operation_timedout() {
        return TransportKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransportKind::Connection;
    }
    TransportKind::Other
}
