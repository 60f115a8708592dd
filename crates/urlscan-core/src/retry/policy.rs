use crate::engine::JobStatus;
use std::time::Duration;

/// Decision after one poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Job reached `completed`; return the result.
    Finish,
    /// Job reported `failed` and the policy treats that as terminal.
    Fail,
    /// Not done yet; wait and poll again.
    RetryAfter(Duration),
    /// Attempt budget exhausted.
    GiveUp,
}

/// Tiered poll schedule: fast early checks, coarse later ones.
///
/// With the defaults: 10 attempts and, between them, 1,1,1,4,4,4,4,4,8 time
/// units (31 in total).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status requests (including the first).
    pub max_attempts: u32,
    /// Length of one backoff unit.
    pub time_unit: Duration,
    /// Stop on an engine-reported `failed` status instead of polling on.
    pub failed_is_terminal: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            time_unit: Duration::from_secs(1),
            failed_is_terminal: false,
        }
    }
}

impl PollPolicy {
    /// Delay to wait after attempt `index` (0-based) was non-terminal.
    ///
    /// Returns `None` after the final attempt.
    pub fn delay_after(&self, index: u32) -> Option<Duration> {
        if index.saturating_add(1) >= self.max_attempts {
            return None;
        }
        let units = match index {
            0..=2 => 1,
            3..=7 => 4,
            _ => 8,
        };
        Some(self.time_unit.saturating_mul(units))
    }

    /// Decide what to do with the status seen on attempt `index` (0-based).
    pub fn decide(&self, index: u32, status: &JobStatus) -> PollDecision {
        match status {
            JobStatus::Completed => PollDecision::Finish,
            JobStatus::Failed if self.failed_is_terminal => PollDecision::Fail,
            _ => match self.delay_after(index) {
                Some(d) => PollDecision::RetryAfter(d),
                None => PollDecision::GiveUp,
            },
        }
    }

    /// All inter-attempt delays, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts)
            .map_while(|i| self.delay_after(i))
            .collect()
    }

    /// Total time spent waiting when a job never completes.
    pub fn total_wait(&self) -> Duration {
        self.schedule().into_iter().sum()
    }
}
