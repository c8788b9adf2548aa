//! Prompt digests built from saved crawl results.
//!
//! A digest flattens every recent post of a result file into a numbered list
//! and wraps it in a fixed summarization prompt. Failed crawls, empty posts and
//! posts outside the recency window are left out.

use crate::models::{CrawlRecord, DigestEntry, PromptDigest};
use crate::outputs::json::{CHECKPOINT_FILE, write_digest};
use crate::parser::dates;
use chrono::NaiveDateTime;
use itertools::Itertools;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

pub const INSTRUCTION: &str = "Summarize all of the following posts, grouped by topic.";

const PROMPT_HEADER: &str = "\
Summarize the following posts from the perspective of a technology editor.

1. Content:
   - Explain the background clearly
   - The subject of each point must be a person or an organization; give a person's role
   - Use plain language and avoid jargon
   - Output plain text without markdown

2. Sources:
   - Prefer information stated directly in the posts
   - Cite a public URL for any outside information
   - Mark speculation as such
   - Present both sides of disputed claims with their sources

Posts:
";

/// Load the crawl records saved in one result file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON record list.
#[instrument(level = "info")]
pub async fn load_results(path: &Path) -> Result<Vec<CrawlRecord>, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    let records: Vec<CrawlRecord> = serde_json::from_str(&raw)?;
    debug!(count = records.len(), "Loaded crawl records");
    Ok(records)
}

/// Flatten the recent posts of successful records, keeping their order.
///
/// # Arguments
///
/// * `records` - Records from one result file.
/// * `days` - Recency window applied to each post's `Mon D` date.
/// * `now` - Reference time for the window.
///
/// # Returns
///
/// One entry per surviving post; `user` is `"Unknown"` for profiles without
/// a handle.
pub fn collect_entries(records: &[CrawlRecord], days: i64, now: NaiveDateTime) -> Vec<DigestEntry> {
    let mut entries = Vec::new();
    for record in records {
        if !record.success {
            debug!(url = %record.url, "Skipping failed crawl");
            continue;
        }
        let Some(profile) = &record.profile else {
            debug!(url = %record.url, "Skipping record without profile");
            continue;
        };

        let user = if profile.username.is_empty() {
            "Unknown".to_string()
        } else {
            profile.username.clone()
        };

        for post in &profile.tweets {
            if post.text.trim().is_empty() || !dates::is_within_days(&post.time, days, now) {
                continue;
            }
            entries.push(DigestEntry {
                user: user.clone(),
                text: post.text.clone(),
                time: post.time.clone(),
                url: record.url.clone(),
                likes: post.likes,
                retweets: post.retweets,
                quotes: post.quotes,
                replies: post.replies,
            });
        }
    }
    entries
}

/// Render the summarization prompt for `entries`.
pub fn build_prompt(entries: &[DigestEntry]) -> String {
    let posts = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let source = if e.url.is_empty() { "no link" } else { e.url.as_str() };
            format!(
                "Post {} ({}, {}):\n{}\nSource: {}\nEngagement: retweets {} | quotes {} | replies {} | likes {}",
                i + 1,
                e.user,
                e.time,
                e.text,
                source,
                e.retweets.unwrap_or(0),
                e.quotes.unwrap_or(0),
                e.replies.unwrap_or(0),
                e.likes.unwrap_or(0),
            )
        })
        .join("\n\n");
    format!("{PROMPT_HEADER}{posts}\n")
}

pub fn build_digest(entries: Vec<DigestEntry>) -> PromptDigest {
    let prompt = build_prompt(&entries);
    PromptDigest {
        instruction: INSTRUCTION.to_string(),
        tweets: entries,
        prompt,
    }
}

/// Build and write the digest for one result file.
///
/// # Returns
///
/// `Ok(None)` when no post survives the filters; nothing is written in that
/// case. Otherwise the path of the written digest.
///
/// # Errors
///
/// Returns an error if the result file cannot be loaded or the digest cannot
/// be written.
#[instrument(level = "info", skip(now))]
pub async fn digest_file(
    path: &Path,
    output_dir: &str,
    days: i64,
    now: NaiveDateTime,
) -> Result<Option<PathBuf>, Box<dyn Error>> {
    let records = load_results(path).await?;
    let entries = collect_entries(&records, days, now);
    if entries.is_empty() {
        info!("No recent posts in result file");
        return Ok(None);
    }

    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "nitter_results.json".to_string());
    let digest = build_digest(entries);
    let written = write_digest(&digest, output_dir, &source_name).await?;
    Ok(Some(written))
}

/// Result files to digest: `input` itself when it is a file, otherwise every
/// `nitter_results_*.json` directly inside it, sorted by name. The crawl
/// checkpoint file is not a result file and is skipped.
///
/// # Errors
///
/// Returns an error if `input` does not exist or the directory cannot be read.
#[instrument(level = "info")]
pub async fn find_result_files(input: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let meta = fs::metadata(input).await?;
    if meta.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut dir = fs::read_dir(input).await?;
    while let Some(entry) = dir.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("nitter_results_") && name.ends_with(".json") && name != CHECKPOINT_FILE {
            files.push(entry.path());
        }
    }
    files.sort();

    if files.is_empty() {
        warn!("No nitter_results files found");
    }
    Ok(files)
}
