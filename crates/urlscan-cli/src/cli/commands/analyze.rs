//! `urlscan analyze <url>...` – run one analysis per URL, concurrently.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use urlscan_core::config::{ConfigError, UrlScanConfig};
use urlscan_core::control::AbortToken;
use urlscan_core::retry::PollPolicy;
use urlscan_core::{
    AnalysisResult, AnalyzeOptions, Orchestrator, OrchestratorError, ScanRequest, VirusTotalClient,
};

/// Flags of the analyze subcommand.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    pub json: bool,
    pub max_attempts: Option<u32>,
    pub deadline_secs: Option<u64>,
}

type Outcome = (ScanRequest, Result<AnalysisResult, OrchestratorError>);

pub async fn run_analyze(cfg: &UrlScanConfig, urls: &[String], args: AnalyzeArgs) -> Result<i32> {
    // Reject bad input before touching the network.
    let requests = urls
        .iter()
        .map(|u| ScanRequest::parse(u).with_context(|| format!("invalid URL {u:?}")))
        .collect::<Result<Vec<_>>>()?;

    let settings = cfg.engine_settings()?;
    tracing::debug!("engine API key loaded: {}", settings.api_key.masked());
    let policy = poll_policy(cfg, args.max_attempts)?;

    let client = VirusTotalClient::new(settings);
    let orchestrator = Arc::new(Orchestrator::new(policy));
    let token = AbortToken::new();
    let options = AnalyzeOptions {
        abort: Some(token.clone()),
        deadline: args
            .deadline_secs
            .map(|s| Instant::now() + Duration::from_secs(s)),
    };

    tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted; cancelling in-flight analyses");
                token.abort();
            }
        }
    });

    let mut set = JoinSet::new();
    for (index, request) in requests.into_iter().enumerate() {
        let client = client.clone();
        let orchestrator = Arc::clone(&orchestrator);
        let options = options.clone();
        set.spawn(async move {
            // One session per analysis; dropped (and its connection closed) when done.
            let mut session = client.session();
            let outcome = orchestrator
                .analyze_with(request.raw(), &mut session, &options)
                .await;
            (index, request, outcome)
        });
    }

    let mut outcomes = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        outcomes.push(joined.context("analysis task failed")?);
    }
    outcomes.sort_by_key(|(index, ..)| *index);
    let outcomes: Vec<Outcome> = outcomes
        .into_iter()
        .map(|(_, request, outcome)| (request, outcome))
        .collect();

    if args.json {
        for line in json_lines(&outcomes)? {
            println!("{line}");
        }
    } else {
        print_table(&outcomes);
    }

    Ok(exit_code(&outcomes))
}

/// Config policy with `--max-attempts` applied; validated the same way as the file.
fn poll_policy(cfg: &UrlScanConfig, max_attempts: Option<u32>) -> Result<PollPolicy, ConfigError> {
    match max_attempts {
        Some(n) => {
            let mut cfg = cfg.clone();
            cfg.polling.max_attempts = n;
            cfg.poll_policy()
        }
        None => cfg.poll_policy(),
    }
}

fn print_table(outcomes: &[Outcome]) {
    println!(
        "{:<10} {:>9} {:>8}  {}",
        "STATUS", "MALICIOUS", "HARMLESS", "URL"
    );
    for (request, outcome) in outcomes {
        match outcome {
            Ok(r) => println!(
                "{:<10} {:>9} {:>8}  {}",
                "ok", r.malicious_votes, r.harmless_votes, r.url
            ),
            Err(e) => {
                let label = if e.is_pending() { "pending" } else { "error" };
                println!(
                    "{:<10} {:>9} {:>8}  {}",
                    label,
                    "-",
                    "-",
                    request.normalized()
                );
                println!("           {e}");
            }
        }
    }
}

fn json_lines(outcomes: &[Outcome]) -> Result<Vec<String>> {
    outcomes
        .iter()
        .map(|(request, outcome)| -> Result<String> {
            let value = match outcome {
                Ok(r) => serde_json::to_value(r)?,
                Err(e) => serde_json::json!({
                    "url": request.normalized(),
                    "error": e.to_string(),
                    "status_code": e.status_code(),
                    "retry_later": e.is_retryable_later(),
                }),
            };
            Ok(serde_json::to_string(&value)?)
        })
        .collect()
}

/// 0 if every URL got a verdict, 2 if the only problems are pending analyses, 1 otherwise.
fn exit_code(outcomes: &[Outcome]) -> i32 {
    let mut code = 0;
    for (_, outcome) in outcomes {
        match outcome {
            Ok(_) => {}
            Err(e) if e.is_pending() => code = code.max(2),
            Err(_) => return 1,
        }
    }
    code
}
