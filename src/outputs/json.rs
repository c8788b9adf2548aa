//! JSON output for crawl results, parsed profiles and prompt digests.
//!
//! # Output Structure
//!
//! ```text
//! results_dir/
//! ├── nitter_results_20250610_221500.json
//! ├── nitter_results_temp.json            # checkpoint, rewritten during a crawl
//! └── failed_urls_20250610_221500.txt     # only when something failed
//!
//! prompts_dir/
//! └── prompts_nitter_results_20250610_221500.json
//! ```

use crate::models::{CrawlRecord, Profile, PromptDigest};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument, warn};

/// Name of the partial-results file rewritten while a crawl is running.
pub const CHECKPOINT_FILE: &str = "nitter_results_temp.json";

/// Write all crawl records to `nitter_results_{stamp}.json`.
///
/// # Arguments
///
/// * `records` - Every record of the crawl, successful or not.
/// * `output_dir` - Results directory; created if missing.
/// * `stamp` - Timestamp suffix, `YYYYmmdd_HHMMSS`.
///
/// # Returns
///
/// Path of the written file.
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub async fn write_results(
    records: &[CrawlRecord],
    output_dir: &str,
    stamp: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(%output_dir, error = %e, "Failed to create results dir");
        return Err(e.into());
    }

    let path = Path::new(output_dir).join(format!("nitter_results_{stamp}.json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote crawl results");
    Ok(path)
}

/// Save the records crawled so far to [`CHECKPOINT_FILE`], replacing any
/// earlier checkpoint.
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
#[instrument(level = "debug", skip(records), fields(count = records.len()))]
pub async fn write_checkpoint(records: &[CrawlRecord], output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;
    fs::create_dir_all(output_dir).await?;
    let path = Path::new(output_dir).join(CHECKPOINT_FILE);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Saved intermediate results");
    Ok(path)
}

/// Write the URLs of failed records to `failed_urls_{stamp}.txt`, one per line.
///
/// # Returns
///
/// `Ok(None)` without touching the disk when nothing failed, otherwise the
/// path of the written list.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
#[instrument(level = "info", skip(records))]
pub async fn write_failed_urls(
    records: &[CrawlRecord],
    output_dir: &str,
    stamp: &str,
) -> Result<Option<PathBuf>, Box<dyn Error>> {
    let failed: Vec<&str> = records
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.url.as_str())
        .collect();
    if failed.is_empty() {
        return Ok(None);
    }

    let path = Path::new(output_dir).join(format!("failed_urls_{stamp}.txt"));
    let mut file = fs::File::create(&path).await?;
    for url in &failed {
        file.write_all(format!("{url}\n").as_bytes()).await?;
    }
    file.flush().await?;

    warn!(count = failed.len(), path = %path.display(), "Some profiles failed to crawl");
    Ok(Some(path))
}

/// Write a parsed profile as pretty JSON, to `output` or stdout.
///
/// # Errors
///
/// Returns an error if the file or stdout cannot be written.
#[instrument(level = "info", skip(profile))]
pub async fn write_profile(profile: &Profile, output: Option<&str>) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(profile)?;
    match output {
        Some(path) => {
            fs::write(path, json).await?;
            info!(%path, "Wrote profile JSON");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

/// Write a prompt digest to `prompts_{source_name}` in `output_dir`.
///
/// # Arguments
///
/// * `digest` - The digest to serialize.
/// * `output_dir` - Existing prompts directory.
/// * `source_name` - File name of the result file the digest came from.
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
#[instrument(level = "info", skip(digest), fields(count = digest.tweets.len()))]
pub async fn write_digest(
    digest: &PromptDigest,
    output_dir: &str,
    source_name: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(digest)?;
    let path = Path::new(output_dir).join(format!("prompts_{source_name}"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote prompt digest");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DigestEntry;

    fn record(url: &str, success: bool) -> CrawlRecord {
        CrawlRecord {
            url: url.to_string(),
            nitter_url: url.replace("x.com", "nitter.net"),
            timestamp: "2025-06-10T12:00:00+00:00".to_string(),
            success,
            error: (!success).then(|| "boom".to_string()),
            profile: success.then(Profile::default),
        }
    }

    #[tokio::test]
    async fn test_write_results_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let records = vec![record("https://x.com/a", true), record("https://x.com/b", false)];

        let path = write_results(&records, out, "20250610_120000").await.unwrap();
        assert!(path.ends_with("nitter_results_20250610_120000.json"));

        let raw = std::fs::read_to_string(&path).unwrap();
        let back: Vec<CrawlRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.len(), 2);
        assert!(back[0].success);
        assert_eq!(back[1].error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_write_checkpoint_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();

        write_checkpoint(&[record("https://x.com/a", true)], out).await.unwrap();
        let records = vec![record("https://x.com/a", true), record("https://x.com/b", false)];
        let path = write_checkpoint(&records, out).await.unwrap();
        assert_eq!(path, dir.path().join(CHECKPOINT_FILE));

        let back: Vec<CrawlRecord> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[1].url, "https://x.com/b");
    }

    #[tokio::test]
    async fn test_write_failed_urls() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let records = vec![
            record("https://x.com/a", false),
            record("https://x.com/b", true),
            record("https://x.com/c", false),
        ];

        let path = write_failed_urls(&records, out, "stamp").await.unwrap().unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        assert_eq!(raw, "https://x.com/a\nhttps://x.com/c\n");
    }

    #[tokio::test]
    async fn test_write_failed_urls_none_failed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let records = vec![record("https://x.com/a", true)];

        assert!(write_failed_urls(&records, out, "stamp").await.unwrap().is_none());
        assert!(!dir.path().join("failed_urls_stamp.txt").exists());
    }

    #[tokio::test]
    async fn test_write_profile_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        let profile = Profile {
            username: "@alice".to_string(),
            display_name: "Alice".to_string(),
            bio: Some("bio".to_string()),
            tweets: vec![],
        };

        write_profile(&profile, path.to_str()).await.unwrap();
        let back: Profile = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, profile);
    }

    #[tokio::test]
    async fn test_write_digest_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let digest = PromptDigest {
            instruction: "i".to_string(),
            tweets: vec![DigestEntry {
                user: "@a".to_string(),
                text: "t".to_string(),
                time: "Jun 10".to_string(),
                url: "https://x.com/a".to_string(),
                likes: None,
                retweets: None,
                quotes: None,
                replies: None,
            }],
            prompt: "p".to_string(),
        };

        let path = write_digest(&digest, out, "nitter_results_1.json").await.unwrap();
        assert_eq!(path, dir.path().join("prompts_nitter_results_1.json"));
        assert!(path.exists());
    }
}
