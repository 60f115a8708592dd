pub mod config;
pub mod logging;

pub mod control;
pub mod engine;
pub mod orchestrator;
pub mod retry;
pub mod url_model;

pub use engine::{ScanEngine, VirusTotalClient};
pub use orchestrator::{AnalysisResult, AnalyzeOptions, Orchestrator, OrchestratorError};
pub use url_model::{normalize_url, NormalizedUrl, ScanRequest};
