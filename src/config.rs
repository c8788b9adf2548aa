//! YAML configuration for the `crawl` command.
//!
//! ```yaml
//! profiles:
//!   - https://x.com/alice
//!   - https://twitter.com/bob
//! nitter_base: https://nitter.net
//! max_age_days: 3
//! request_timeout_secs: 30
//! ```
//!
//! Every field is optional. Command-line flags override the file.

use crate::parser::DEFAULT_MAX_AGE_DAYS;
use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

pub const DEFAULT_NITTER_BASE: &str = "https://nitter.net";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// X/Twitter profile URLs to crawl.
    pub profiles: Vec<String>,
    /// Nitter instance the profiles are fetched from.
    pub nitter_base: String,
    pub max_age_days: i64,
    pub request_timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            profiles: Vec::new(),
            nitter_base: DEFAULT_NITTER_BASE.to_string(),
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            request_timeout_secs: 30,
        }
    }
}

/// Load a [`CrawlConfig`] from a YAML file.
#[instrument(level = "info")]
pub async fn load_config(path: &str) -> Result<CrawlConfig, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    let config: CrawlConfig = serde_yaml::from_str(&raw)?;
    info!(profiles = config.profiles.len(), nitter_base = %config.nitter_base, "Loaded configuration");
    Ok(config)
}
