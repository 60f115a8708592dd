use crate::retry::PollPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the engine API key; overrides the file.
pub const API_KEY_ENV: &str = "VIRUS_TOTAL_API_KEY";
/// Environment variable enabling debug logging (`1`, `true`, `True`).
pub const DEBUG_ENV: &str = "DEVELOPMENT_ENV";

pub const DEFAULT_BASE_URL: &str = "https://www.virustotal.com/api/v3";

/// Startup configuration problems. Fatal for the process, never per-request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("engine API key not configured (set VIRUS_TOTAL_API_KEY or engine.api_key in config.toml)")]
    MissingApiKey,
    #[error("polling.max_attempts must be at least 1")]
    NoAttempts,
}

/// Engine connection parameters (`[engine]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// API key; usually left out of the file and supplied via the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the engine's v3 API.
    pub base_url: String,
    /// Upper bound for one HTTP round trip, in seconds.
    pub request_timeout_secs: u64,
    /// Upper bound for establishing a connection, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 15,
        }
    }
}

/// Poll schedule parameters (`[polling]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Maximum number of status requests per analysis.
    pub max_attempts: u32,
    /// Length of one backoff unit in milliseconds.
    pub time_unit_ms: u64,
    /// Treat an engine-reported `failed` status as terminal.
    pub failed_is_terminal: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            time_unit_ms: 1000,
            failed_is_terminal: false,
        }
    }
}

/// Global configuration loaded from `~/.config/urlscan/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlScanConfig {
    /// Verbose per-attempt logging.
    pub debug: bool,
    pub engine: EngineConfig,
    pub polling: PollingConfig,
}

/// Engine API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First four characters followed by `****`.
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{prefix}****")
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.masked())
    }
}

/// Resolved settings the engine client is built from.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub api_key: ApiKey,
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl EngineSettings {
    pub fn new(api_key: ApiKey, base_url: impl Into<String>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            api_key,
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(defaults.request_timeout_secs),
            connect_timeout: Duration::from_secs(defaults.connect_timeout_secs),
        }
    }
}

impl UrlScanConfig {
    /// Settings for the engine client; fails when no API key is configured.
    pub fn engine_settings(&self) -> Result<EngineSettings, ConfigError> {
        let key = self
            .engine
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        Ok(EngineSettings {
            api_key: ApiKey::new(key),
            base_url: self.engine.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(self.engine.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.engine.connect_timeout_secs),
        })
    }

    /// Poll schedule for the orchestrator.
    pub fn poll_policy(&self) -> Result<PollPolicy, ConfigError> {
        if self.polling.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        Ok(PollPolicy {
            max_attempts: self.polling.max_attempts,
            time_unit: Duration::from_millis(self.polling.time_unit_ms),
            failed_is_terminal: self.polling.failed_is_terminal,
        })
    }

    /// Apply `VIRUS_TOTAL_API_KEY` and `DEVELOPMENT_ENV` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(API_KEY_ENV).ok().as_deref(),
            std::env::var(DEBUG_ENV).ok().as_deref(),
        );
    }

    fn apply_overrides(&mut self, api_key: Option<&str>, debug: Option<&str>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.engine.api_key = Some(key.trim().to_string());
        }
        if let Some(flag) = debug {
            if matches!(flag, "1" | "true" | "True") {
                self.debug = true;
            }
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlscan")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// Environment overrides are applied on top.
pub fn load_or_init() -> Result<UrlScanConfig> {
    let path = config_path()?;
    let mut cfg = if path.exists() {
        load_from(&path)?
    } else {
        let default_cfg = UrlScanConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    };
    cfg.apply_env();
    Ok(cfg)
}

/// Load configuration from an explicit path (no environment overrides).
pub fn load_from(path: &Path) -> Result<UrlScanConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: UrlScanConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
