//! In-memory `ScanEngine` that replays scripted responses and records calls.

use std::collections::VecDeque;
use tokio::time::Instant;
use urlscan_core::engine::{EngineError, JobId, JobReport, JobStatus, ScanEngine, VoteTally};
use urlscan_core::NormalizedUrl;

pub struct ScriptedEngine {
    submit: Option<Result<JobId, EngineError>>,
    polls: VecDeque<Result<JobReport, EngineError>>,
    /// Returned once `polls` runs dry.
    fallback: JobStatus,
    pub submitted: Vec<String>,
    pub polled: Vec<(String, Instant)>,
}

impl ScriptedEngine {
    pub fn new(job_id: &str) -> Self {
        Self {
            submit: Some(Ok(JobId::new(job_id))),
            polls: VecDeque::new(),
            fallback: JobStatus::Queued,
            submitted: Vec::new(),
            polled: Vec::new(),
        }
    }

    pub fn failing_submit(err: EngineError) -> Self {
        let mut engine = Self::new("unused");
        engine.submit = Some(Err(err));
        engine
    }

    pub fn then_status(mut self, status: &str) -> Self {
        self.polls.push_back(Ok(JobReport {
            status: JobStatus::parse(status),
            stats: VoteTally::default(),
        }));
        self
    }

    pub fn then_completed(mut self, malicious: u64, harmless: u64) -> Self {
        self.polls.push_back(Ok(JobReport {
            status: JobStatus::Completed,
            stats: VoteTally {
                malicious,
                harmless,
            },
        }));
        self
    }

    pub fn then_error(mut self, err: EngineError) -> Self {
        self.polls.push_back(Err(err));
        self
    }

    pub fn forever(mut self, status: &str) -> Self {
        self.fallback = JobStatus::parse(status);
        self
    }

    /// Gaps between consecutive polls.
    pub fn poll_gaps(&self) -> Vec<std::time::Duration> {
        self.polled
            .windows(2)
            .map(|w| w[1].1.duration_since(w[0].1))
            .collect()
    }
}

impl ScanEngine for ScriptedEngine {
    async fn submit(&mut self, url: &NormalizedUrl) -> Result<JobId, EngineError> {
        self.submitted.push(url.as_str().to_string());
        self.submit
            .take()
            .unwrap_or_else(|| panic!("submit called twice"))
    }

    async fn poll(&mut self, job: &JobId) -> Result<JobReport, EngineError> {
        self.polled.push((job.as_str().to_string(), Instant::now()));
        self.polls.pop_front().unwrap_or_else(|| {
            Ok(JobReport {
                status: self.fallback.clone(),
                stats: VoteTally::default(),
            })
        })
    }
}
