//! `urlscan normalize <url>` – print the form submitted to the engine.

use anyhow::Result;
use urlscan_core::normalize_url;

pub fn run_normalize(url: &str) -> Result<()> {
    let normalized = normalize_url(url)?;
    println!("{normalized}");
    Ok(())
}
