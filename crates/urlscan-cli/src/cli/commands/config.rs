//! `urlscan config` – show where the config lives and what is in effect.

use anyhow::Result;
use urlscan_core::config::{self, ApiKey, UrlScanConfig};

/// Copy of `cfg` safe to print: the API key is masked.
fn redacted(cfg: &UrlScanConfig) -> UrlScanConfig {
    let mut shown = cfg.clone();
    shown.engine.api_key = shown
        .engine
        .api_key
        .take()
        .map(|k| ApiKey::new(k).masked());
    shown
}

pub fn run_config(cfg: &UrlScanConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(&redacted(cfg))?);
    if cfg.engine.api_key.is_none() {
        println!("# engine.api_key not set; export {}", config::API_KEY_ENV);
    }
    Ok(())
}
