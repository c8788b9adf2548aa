//! # Nitter Digest
//!
//! Crawls social-media profiles through a Nitter instance, parses each
//! profile page into recent posts with engagement counts, and turns the
//! saved results into prompt digests for a downstream summarizer.
//!
//! ## Usage
//!
//! ```sh
//! nitter_digest crawl -c config.yaml -o ./nitter_results
//! nitter_digest digest -i ./nitter_results -o ./prompts
//! nitter_digest parse snapshot.md --max-age-days 7
//! ```
//!
//! ## Architecture
//!
//! 1. **Crawling**: rewrite profile URLs to Nitter and fetch each page
//! 2. **Rendering**: turn the HTML into a link-annotated text snapshot
//! 3. **Parsing**: extract handle, display name, bio and recent posts
//! 4. **Output**: write timestamped result files, then prompt digests

use chrono::Local;
use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod cli;
mod config;
mod digest;
mod models;
mod outputs;
mod parser;
mod scrapers;
mod utils;

use cli::{Cli, Command};
use config::{CrawlConfig, load_config};
use outputs::json;
use scrapers::nitter;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Parse {
            input,
            max_age_days,
            output,
        } => run_parse(&input, max_age_days, output.as_deref()).await?,
        Command::Crawl {
            config,
            urls,
            nitter_base,
            max_age_days,
            output_dir,
        } => {
            let mut conf = match config {
                Some(path) => load_config(&path).await?,
                None => CrawlConfig::default(),
            };
            conf.profiles.extend(urls);
            if let Some(base) = nitter_base {
                conf.nitter_base = base;
            }
            if let Some(days) = max_age_days {
                conf.max_age_days = days;
            }
            run_crawl(conf, &output_dir).await?
        }
        Command::Digest {
            input,
            output_dir,
            days,
        } => run_digest(&input, &output_dir, days).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

#[instrument(level = "info")]
async fn run_parse(input: &str, max_age_days: i64, output: Option<&str>) -> Result<(), Box<dyn Error>> {
    let content = if input == "-" {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(input).await?
    };

    let profile = parser::parse(&content, max_age_days);
    json::write_profile(&profile, output).await
}

#[instrument(level = "info", skip(conf))]
async fn run_crawl(conf: CrawlConfig, output_dir: &str) -> Result<(), Box<dyn Error>> {
    let urls: Vec<String> = conf.profiles.into_iter().unique().collect();
    if urls.is_empty() {
        error!("No profile URLs configured; pass --url or list them under `profiles` in the config");
        return Err("no profile URLs configured".into());
    }

    // Early check: ensure the results dir is writable before crawling anything
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(path = %output_dir, error = %e, "Results directory is not writable");
        return Err(e);
    }

    let base = Url::parse(&conf.nitter_base)?;
    let client = nitter::build_client(Duration::from_secs(conf.request_timeout_secs))?;
    info!(count = urls.len(), nitter_base = %base, max_age_days = conf.max_age_days, "Starting crawl");

    let records =
        nitter::crawl_profiles(&client, &urls, &base, conf.max_age_days, Some(output_dir)).await;

    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let results_path = json::write_results(&records, output_dir, &stamp).await?;
    if let Err(e) = json::write_failed_urls(&records, output_dir, &stamp).await {
        error!(error = %e, "Failed to write failed URL list");
    }

    let failed = records.iter().filter(|r| !r.success).count();
    info!(
        path = %results_path.display(),
        successful = records.len() - failed,
        failed,
        "Crawl complete"
    );
    Ok(())
}

#[instrument(level = "info")]
async fn run_digest(input: &str, output_dir: &str, days: i64) -> Result<(), Box<dyn Error>> {
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(path = %output_dir, error = %e, "Prompt directory is not writable");
        return Err(e);
    }

    let files = digest::find_result_files(Path::new(input)).await?;
    if files.is_empty() {
        warn!(%input, "Nothing to digest");
        return Ok(());
    }

    let now = Local::now().naive_local();
    let mut written = 0usize;
    for file in &files {
        match digest::digest_file(file, output_dir, days, now).await {
            Ok(Some(path)) => {
                written += 1;
                info!(source = %file.display(), path = %path.display(), "Digested result file");
            }
            Ok(None) => {
                info!(source = %file.display(), days, "No recent posts; skipped");
            }
            Err(e) => {
                error!(source = %file.display(), error = %e, "Failed to digest result file");
            }
        }
    }

    info!(files = files.len(), written, "Digest complete");
    Ok(())
}
