//! JSON bodies of the VirusTotal v3 `urls` and `analyses` endpoints.

use crate::engine::{EngineError, JobId, JobReport, JobStatus, VoteTally};
use serde::Deserialize;

#[derive(Deserialize)]
struct SubmitEnvelope {
    data: SubmitData,
}

#[derive(Deserialize)]
struct SubmitData {
    id: String,
}

#[derive(Deserialize, Default)]
struct AnalysisEnvelope {
    #[serde(default)]
    data: AnalysisData,
}

#[derive(Deserialize, Default)]
struct AnalysisData {
    #[serde(default)]
    attributes: AnalysisAttributes,
}

#[derive(Deserialize, Default)]
struct AnalysisAttributes {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    stats: VoteTally,
}

/// Extracts `data.id` from a submission response.
pub(super) fn job_id(body: &str) -> Result<JobId, EngineError> {
    let env: SubmitEnvelope = serde_json::from_str(body)
        .map_err(|e| EngineError::MalformedResponse(format!("submission body: {e}")))?;
    if env.data.id.is_empty() {
        return Err(EngineError::MalformedResponse(
            "submission body: empty data.id".to_string(),
        ));
    }
    Ok(JobId::new(env.data.id))
}

/// Extracts status and stats from an analysis response.
///
/// Absent `data`, `attributes`, `status` or `stats` are tolerated: the job is
/// then reported with an empty (non-terminal) status and zero votes.
pub(super) fn job_report(body: &str) -> Result<JobReport, EngineError> {
    let env: AnalysisEnvelope = serde_json::from_str(body)
        .map_err(|e| EngineError::MalformedResponse(format!("analysis body: {e}")))?;
    let attrs = env.data.attributes;
    Ok(JobReport {
        status: JobStatus::parse(attrs.status.as_deref().unwrap_or("")),
        stats: attrs.stats,
    })
}
