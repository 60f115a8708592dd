//! Scan engine boundary.
//!
//! The orchestrator only depends on the [`ScanEngine`] trait. A value
//! implementing it is a session scoped to one analysis: it is created per
//! call and dropped on every exit path, releasing whatever connection it
//! holds.

mod error;
mod job;
pub mod virustotal;

pub use error::EngineError;
pub use job::{JobId, JobReport, JobStatus, VoteTally};
pub use virustotal::{VirusTotalClient, VirusTotalSession};

use crate::url_model::NormalizedUrl;
use std::future::Future;

/// Asynchronous scanning engine: submit a URL, then poll the job it created.
pub trait ScanEngine: Send {
    /// Create a scan job for `url`; returns the engine's opaque job id.
    fn submit(
        &mut self,
        url: &NormalizedUrl,
    ) -> impl Future<Output = Result<JobId, EngineError>> + Send;

    /// Fetch the current status (and votes, once completed) of `job`.
    fn poll(&mut self, job: &JobId) -> impl Future<Output = Result<JobReport, EngineError>> + Send;
}
