//! CLI command handlers. Each command is in its own file.

mod analyze;
mod completions;
mod config;
mod normalize;

pub use analyze::{run_analyze, AnalyzeArgs};
pub use completions::run_completions;
pub use config::run_config;
pub use normalize::run_normalize;
