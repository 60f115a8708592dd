//! Poll and backoff policy.
//!
//! This module holds the tiered poll schedule and the classification of
//! engine/transport failures, so the orchestrator loop stays a thin state
//! machine over these decisions.

mod classify;
mod policy;

pub use classify::{classify_curl_error, classify_http_status, RejectionKind, TransportKind};
pub use policy::{PollDecision, PollPolicy};
