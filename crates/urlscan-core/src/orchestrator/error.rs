//! Terminal failure kinds of one analysis.

use crate::engine::{EngineError, JobId, JobStatus};
use crate::retry::{classify_http_status, TransportKind};
use crate::url_model::UrlError;
use std::fmt;
use thiserror::Error;

/// Which engine call a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Submit,
    Poll,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Submit => write!(f, "submission"),
            Stage::Poll => write!(f, "status request"),
        }
    }
}

/// Every way an analysis can end other than with a verdict.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("engine rejected submission (HTTP {status}): {body}")]
    Submission { status: u16, body: String },

    #[error("engine rejected status request (HTTP {status}): {body}")]
    Poll { status: u16, body: String },

    #[error("engine unreachable during {stage} ({kind}): {message}")]
    Transport {
        stage: Stage,
        kind: TransportKind,
        message: String,
    },

    #[error("unexpected engine response during {stage}: {detail}")]
    MalformedResponse { stage: Stage, detail: String },

    #[error("analysis still pending after {attempts} attempts (last status: {last_status}); try again later")]
    PendingTimeout { attempts: u32, last_status: JobStatus },

    #[error("engine reported analysis {job_id} as failed")]
    EngineFailed { job_id: JobId },

    #[error("analysis cancelled")]
    Cancelled,
}

impl OrchestratorError {
    pub(crate) fn from_engine(stage: Stage, e: EngineError) -> Self {
        match e {
            EngineError::Rejected { status, body } => match stage {
                Stage::Submit => OrchestratorError::Submission { status, body },
                Stage::Poll => OrchestratorError::Poll { status, body },
            },
            EngineError::Transport { kind, message } => OrchestratorError::Transport {
                stage,
                kind,
                message,
            },
            EngineError::MalformedResponse(detail) => {
                OrchestratorError::MalformedResponse { stage, detail }
            }
        }
    }

    /// HTTP status a front end should answer with.
    ///
    /// Engine rejections pass the upstream code through; a pending analysis
    /// is 202 so clients know to come back later.
    pub fn status_code(&self) -> u16 {
        match self {
            OrchestratorError::InvalidUrl(_) => 422,
            OrchestratorError::Submission { status, .. } | OrchestratorError::Poll { status, .. } => {
                *status
            }
            OrchestratorError::Transport { .. } => 502,
            OrchestratorError::MalformedResponse { .. } => 502,
            OrchestratorError::PendingTimeout { .. } => 202,
            OrchestratorError::EngineFailed { .. } => 502,
            OrchestratorError::Cancelled => 499,
        }
    }

    /// True when the same request may succeed later without changes.
    pub fn is_retryable_later(&self) -> bool {
        match self {
            OrchestratorError::PendingTimeout { .. } | OrchestratorError::Transport { .. } => true,
            OrchestratorError::Submission { status, .. } | OrchestratorError::Poll { status, .. } => {
                classify_http_status(*status).is_transient()
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OrchestratorError::PendingTimeout { .. })
    }
}
