//! CLI for urlscan.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use urlscan_core::{config, logging};

use commands::{run_analyze, run_completions, run_config, run_normalize, AnalyzeArgs};

/// Top-level CLI for urlscan.
#[derive(Debug, Parser)]
#[command(name = "urlscan")]
#[command(about = "urlscan: URL reputation verdicts from an asynchronous scan engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Submit URLs to the scan engine and wait for their verdicts.
    Analyze {
        /// Absolute http/https URLs. Several URLs are analyzed concurrently.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Print one JSON object per URL instead of a table.
        #[arg(long)]
        json: bool,
        /// Override the configured number of status polls per URL.
        #[arg(long, value_name = "N")]
        max_attempts: Option<u32>,
        /// Give up (as pending) after this many seconds.
        #[arg(long, value_name = "SECS")]
        deadline: Option<u64>,
    },

    /// Print the normalized form of a URL (no network access).
    Normalize {
        /// URL to normalize.
        url: String,
    },

    /// Show the config file path and effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    /// Parses arguments, runs the command, and returns the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;

        if logging::init_logging(cfg.debug).is_err() {
            logging::init_logging_stderr(cfg.debug);
        }
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Analyze {
                urls,
                json,
                max_attempts,
                deadline,
            } => {
                let args = AnalyzeArgs {
                    json,
                    max_attempts,
                    deadline_secs: deadline,
                };
                return run_analyze(&cfg, &urls, args).await;
            }
            CliCommand::Normalize { url } => run_normalize(&url)?,
            CliCommand::Config => run_config(&cfg)?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests;
