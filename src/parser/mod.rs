//! Parsing of link-annotated Nitter profile snapshots.
//!
//! A snapshot is the text rendering of one profile page: body text mixed with
//! `[label](url "title")` annotations and bare numeric lines for engagement
//! counts. [`parse`] turns it into a [`Profile`] holding the posts from the
//! last `max_age_days` days.
//!
//! # Pipeline
//!
//! 1. Profile header: handle, display name, bio
//! 2. Segmentation: a new post starts at every line beginning with `[Mon D]`
//! 3. Per block: date token, recency filter ([`dates`]), engagement counts
//!    ([`metrics`]), text cleaning ([`clean`])
//!
//! Parsing is total. Missing header fields are left empty or unset, and a block
//! that cannot be dated or cleans down to nothing is skipped.

pub mod clean;
pub mod dates;
pub mod metrics;

use crate::models::{Post, Profile};
use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Default recency window in days.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 3;

const MONTH_ALT: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec";

static HANDLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("valid handle regex"));

static DISPLAY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[([^\]]+)\]\([^)]+\s+"([^"]+)"\)\s+\[@\w+\]"#).expect("valid display name regex")
});

static BIO: Lazy<Regex> = Lazy::new(|| Regex::new(r"Bio:\s+([^\n]+)").expect("valid bio regex"));

static BLOCK_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\n\[(?:{MONTH_ALT})\s+\d{{1,2}}\]")).expect("valid block start regex")
});

static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\[((?:{MONTH_ALT})\s+\d{{1,2}})\]")).expect("valid date token regex")
});

/// Parse a snapshot against the local clock.
pub fn parse(content: &str, max_age_days: i64) -> Profile {
    parse_at(content, max_age_days, Local::now().naive_local())
}

/// Parse a snapshot, resolving date tokens against `now`.
///
/// CRLF line endings are read as plain newlines.
pub fn parse_at(content: &str, max_age_days: i64, now: NaiveDateTime) -> Profile {
    let content = content.replace("\r\n", "\n");
    let mut profile = Profile::default();

    if let Some(caps) = HANDLE.captures(&content) {
        let handle = &caps[1];
        profile.username = format!("@{handle}");
        profile.display_name = DISPLAY_NAME
            .captures(&content)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| handle.to_string());
    }

    profile.bio = BIO.captures(&content).map(|c| c[1].trim().to_string());

    let blocks = split_blocks(&content);
    let total = blocks.len();
    for block in blocks {
        if let Some(post) = parse_block(block, max_age_days, now) {
            profile.tweets.push(post);
        }
    }

    info!(
        username = %profile.username,
        blocks = total,
        kept = profile.tweets.len(),
        max_age_days,
        "Parsed profile snapshot"
    );
    profile
}

/// Split `content` before every line that opens with a `[Mon D]` token.
///
/// The newline at each boundary is dropped; the token stays at the head of the
/// following block.
pub fn split_blocks(content: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = 0;
    for m in BLOCK_START.find_iter(content) {
        blocks.push(&content[start..m.start()]);
        start = m.start() + 1;
    }
    blocks.push(&content[start..]);
    blocks
}

fn parse_block(block: &str, max_age_days: i64, now: NaiveDateTime) -> Option<Post> {
    if block.trim().is_empty() {
        return None;
    }

    let Some(caps) = DATE_TOKEN.captures(block) else {
        debug!("Skipping block without date token");
        return None;
    };
    let time = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");

    if !dates::is_within_days(&time, max_age_days, now) {
        debug!(%time, "Skipping post outside recency window");
        return None;
    }

    let counts = metrics::extract_metrics(block);
    let text = clean::clean_post_text(block);
    if text.is_empty() {
        debug!(%time, "Skipping post with no text after cleaning");
        return None;
    }

    Some(Post::new(text, time, counts))
}
