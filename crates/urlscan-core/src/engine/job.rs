//! Types describing one engine-side analysis job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque job identifier assigned by the engine; forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status as reported by the engine.
///
/// Values outside the known set are kept as `Other` and treated as
/// non-terminal; the engine may introduce new interim states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "queued" => JobStatus::Queued,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) if s.is_empty() => "<none>",
            JobStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine vote counts. Missing categories count as zero; other categories
/// (suspicious, undetected, ...) are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteTally {
    pub malicious: u64,
    pub harmless: u64,
}

/// One status observation of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub status: JobStatus,
    /// Only meaningful once `status` is `Completed`.
    pub stats: VoteTally,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_known_and_unknown() {
        assert_eq!(JobStatus::parse("queued"), JobStatus::Queued);
        assert_eq!(JobStatus::parse("running"), JobStatus::Running);
        assert_eq!(JobStatus::parse("completed"), JobStatus::Completed);
        assert_eq!(JobStatus::parse("failed"), JobStatus::Failed);
        assert_eq!(
            JobStatus::parse("Completed"),
            JobStatus::Other("Completed".to_string())
        );
        assert_eq!(JobStatus::parse("").to_string(), "<none>");
    }

    #[test]
    fn tally_missing_fields_default_to_zero() {
        let t: VoteTally = serde_json::from_str(r#"{"malicious": 3}"#).unwrap();
        assert_eq!(t.malicious, 3);
        assert_eq!(t.harmless, 0);

        let t: VoteTally =
            serde_json::from_str(r#"{"harmless": 7, "suspicious": 1, "undetected": 9}"#).unwrap();
        assert_eq!(t, VoteTally { malicious: 0, harmless: 7 });
    }
}
