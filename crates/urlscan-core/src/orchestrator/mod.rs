//! Analysis orchestrator: submit, poll on a tiered backoff, terminate.
//!
//! One [`Orchestrator::analyze`] call owns its engine session and the job it
//! creates; nothing is shared between calls, so any number of analyses can
//! run concurrently on the same runtime. The backoff waits are the only
//! suspension points besides the engine calls themselves.

mod error;

pub use error::{OrchestratorError, Stage};

use crate::control::AbortToken;
use crate::engine::{JobId, JobStatus, ScanEngine, VoteTally};
use crate::retry::{PollDecision, PollPolicy};
use crate::url_model::{normalize_url, NormalizedUrl};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Verdict returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Normalized URL that was submitted.
    pub url: String,
    pub malicious_votes: u64,
    pub harmless_votes: u64,
}

/// Optional caller-side limits layered on top of the attempt budget.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Checked before each poll and during each backoff wait.
    pub abort: Option<AbortToken>,
    /// Give up (as pending) rather than poll or wait past this instant.
    pub deadline: Option<Instant>,
}

/// Engine-side job as seen from one analysis. Never outlives the call.
#[derive(Debug)]
struct ScanJob {
    id: JobId,
    status: JobStatus,
    stats: VoteTally,
    /// Status requests issued so far.
    polls: u32,
}

impl ScanJob {
    fn new(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Other(String::new()),
            stats: VoteTally::default(),
            polls: 0,
        }
    }

    fn pending(self) -> OrchestratorError {
        OrchestratorError::PendingTimeout {
            attempts: self.polls,
            last_status: self.status,
        }
    }
}

enum Phase {
    Submitting,
    Polling(ScanJob),
    Waiting(ScanJob, Duration),
}

#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    policy: PollPolicy,
}

impl Orchestrator {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    /// Normalize `url`, submit it to `engine` and wait for the verdict.
    pub async fn analyze<E: ScanEngine>(
        &self,
        url: &str,
        engine: &mut E,
    ) -> Result<AnalysisResult, OrchestratorError> {
        self.analyze_with(url, engine, &AnalyzeOptions::default())
            .await
    }

    /// Like [`analyze`](Self::analyze), honoring an abort token and deadline.
    pub async fn analyze_with<E: ScanEngine>(
        &self,
        url: &str,
        engine: &mut E,
        opts: &AnalyzeOptions,
    ) -> Result<AnalysisResult, OrchestratorError> {
        let url = normalize_url(url)?;
        self.run(url, engine, opts).await
    }

    async fn run<E: ScanEngine>(
        &self,
        url: NormalizedUrl,
        engine: &mut E,
        opts: &AnalyzeOptions,
    ) -> Result<AnalysisResult, OrchestratorError> {
        let max = self.policy.max_attempts;
        let mut phase = Phase::Submitting;

        loop {
            phase = match phase {
                Phase::Submitting => {
                    if is_aborted(opts) {
                        return Err(OrchestratorError::Cancelled);
                    }
                    let id = engine
                        .submit(&url)
                        .await
                        .map_err(|e| OrchestratorError::from_engine(Stage::Submit, e))?;
                    tracing::debug!(url = %url, job = %id, "submitted analysis");
                    Phase::Polling(ScanJob::new(id))
                }

                Phase::Polling(mut job) => {
                    if is_aborted(opts) {
                        return Err(OrchestratorError::Cancelled);
                    }
                    if deadline_passed(opts, Duration::ZERO) {
                        tracing::debug!(url = %url, job = %job.id, "deadline reached before poll");
                        return Err(job.pending());
                    }

                    let report = engine
                        .poll(&job.id)
                        .await
                        .map_err(|e| OrchestratorError::from_engine(Stage::Poll, e))?;
                    let index = job.polls;
                    job.polls += 1;
                    job.status = report.status;
                    job.stats = report.stats;

                    tracing::debug!(
                        "attempt {}/{} for {}: status={}, malicious={}, harmless={}",
                        job.polls,
                        max,
                        url,
                        job.status,
                        job.stats.malicious,
                        job.stats.harmless
                    );

                    match self.policy.decide(index, &job.status) {
                        PollDecision::Finish => {
                            return Ok(AnalysisResult {
                                url: url.into_string(),
                                malicious_votes: job.stats.malicious,
                                harmless_votes: job.stats.harmless,
                            });
                        }
                        PollDecision::Fail => {
                            tracing::warn!(url = %url, job = %job.id, "engine reported analysis failed");
                            return Err(OrchestratorError::EngineFailed { job_id: job.id });
                        }
                        PollDecision::RetryAfter(delay) => Phase::Waiting(job, delay),
                        PollDecision::GiveUp => {
                            tracing::info!(
                                "analysis for {} still pending after {} attempts (last_status={})",
                                url,
                                job.polls,
                                job.status
                            );
                            return Err(job.pending());
                        }
                    }
                }

                Phase::Waiting(job, delay) => {
                    if deadline_passed(opts, delay) {
                        tracing::debug!(url = %url, job = %job.id, "deadline falls inside backoff");
                        return Err(job.pending());
                    }
                    match &opts.abort {
                        Some(token) => {
                            tokio::select! {
                                _ = tokio::time::sleep(delay) => {}
                                _ = token.cancelled() => return Err(OrchestratorError::Cancelled),
                            }
                        }
                        None => tokio::time::sleep(delay).await,
                    }
                    Phase::Polling(job)
                }
            };
        }
    }
}

fn is_aborted(opts: &AnalyzeOptions) -> bool {
    opts.abort.as_ref().is_some_and(AbortToken::is_aborted)
}

/// True if `opts.deadline` would be reached within `ahead`.
fn deadline_passed(opts: &AnalyzeOptions, ahead: Duration) -> bool {
    opts.deadline
        .is_some_and(|deadline| Instant::now() + ahead >= deadline)
}
