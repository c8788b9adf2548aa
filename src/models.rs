//! Data models for parsed profiles, crawl results, and prompt digests.
//!
//! This module defines the records that flow through the pipeline:
//! - [`Profile`] and [`Post`]: the structured result of parsing one profile snapshot
//! - [`CrawlRecord`]: one crawled profile URL, successful or not, as saved to disk
//! - [`DigestEntry`] and [`PromptDigest`]: the flattened, recency-filtered posts
//!   handed to a downstream summarizer
//!
//! All records serialize with snake_case field names. Unset engagement counts
//! serialize as `null`.

use crate::parser::metrics::Metrics;
use serde::{Deserialize, Serialize};

/// A parsed profile page.
///
/// `username` carries the leading `@` and is empty only when the snapshot
/// contained no handle at all. `tweets` keeps the order the posts appeared in
/// the snapshot (most recent first, as Nitter renders them).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// The handle, e.g. `@alice`.
    pub username: String,
    /// The visible profile name, falling back to the bare handle.
    pub display_name: String,
    /// The profile bio, when the snapshot carried a `Bio:` line.
    pub bio: Option<String>,
    /// Recent posts that survived the recency filter and cleaning.
    pub tweets: Vec<Post>,
}

/// A single post with its cleaned text and optional engagement counts.
///
/// The four counts are either all set or all unset. Build posts through
/// [`Post::new`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Post {
    /// Cleaned post body. Never empty.
    pub text: String,
    /// Coarse relative date label such as `Jun 10`.
    pub time: String,
    pub likes: Option<u64>,
    pub retweets: Option<u64>,
    pub quotes: Option<u64>,
    pub replies: Option<u64>,
}

impl Post {
    /// Build a post, spreading `metrics` across the four count fields.
    pub fn new(text: String, time: String, metrics: Option<Metrics>) -> Self {
        match metrics {
            Some(m) => Post {
                text,
                time,
                likes: Some(m.likes),
                retweets: Some(m.retweets),
                quotes: Some(m.quotes),
                replies: Some(m.replies),
            },
            None => Post {
                text,
                time,
                likes: None,
                retweets: None,
                quotes: None,
                replies: None,
            },
        }
    }
}

/// The outcome of crawling one profile URL.
///
/// Failed crawls are kept in the result file alongside successful ones so a
/// later run can see what was missed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlRecord {
    /// The profile URL as configured (usually an x.com or twitter.com link).
    pub url: String,
    /// The Nitter URL that was actually fetched.
    pub nitter_url: String,
    /// Crawl time in RFC 3339.
    pub timestamp: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// One post flattened for the prompt digest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DigestEntry {
    pub user: String,
    pub text: String,
    pub time: String,
    /// The profile URL the post was crawled from.
    pub url: String,
    pub likes: Option<u64>,
    pub retweets: Option<u64>,
    pub quotes: Option<u64>,
    pub replies: Option<u64>,
}

/// A prompt digest built from one result file.
#[derive(Debug, Deserialize, Serialize)]
pub struct PromptDigest {
    pub instruction: String,
    pub tweets: Vec<DigestEntry>,
    pub prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_new_with_metrics() {
        let post = Post::new(
            "Hello".to_string(),
            "Jun 10".to_string(),
            Some(Metrics {
                retweets: 5,
                quotes: 2,
                replies: 1,
                likes: 10,
            }),
        );
        assert_eq!(post.retweets, Some(5));
        assert_eq!(post.quotes, Some(2));
        assert_eq!(post.replies, Some(1));
        assert_eq!(post.likes, Some(10));
    }

    #[test]
    fn test_post_new_without_metrics() {
        let post = Post::new("Hello".to_string(), "Jun 10".to_string(), None);
        assert_eq!(post.likes, None);
        assert_eq!(post.retweets, None);
        assert_eq!(post.quotes, None);
        assert_eq!(post.replies, None);
    }

    #[test]
    fn test_profile_serialization_field_names() {
        let profile = Profile {
            username: "@alice".to_string(),
            display_name: "Alice".to_string(),
            bio: None,
            tweets: vec![Post::new("Hi".to_string(), "Jun 10".to_string(), None)],
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["username"], "@alice");
        assert_eq!(value["display_name"], "Alice");
        assert!(value["bio"].is_null());
        assert_eq!(value["tweets"][0]["text"], "Hi");
        assert_eq!(value["tweets"][0]["time"], "Jun 10");
        assert!(value["tweets"][0]["likes"].is_null());
        assert!(value["tweets"][0]["quotes"].is_null());
    }

    #[test]
    fn test_crawl_record_failed_deserialization() {
        let json = r#"{
            "url": "https://x.com/alice",
            "nitter_url": "https://nitter.net/alice",
            "timestamp": "2025-06-10T12:00:00+00:00",
            "success": false,
            "error": "timed out"
        }"#;

        let record: CrawlRecord = serde_json::from_str(json).unwrap();
        assert!(!record.success);
        assert_eq!(record.error.as_deref(), Some("timed out"));
        assert!(record.profile.is_none());
    }

    #[test]
    fn test_crawl_record_skips_empty_error() {
        let record = CrawlRecord {
            url: "https://x.com/alice".to_string(),
            nitter_url: "https://nitter.net/alice".to_string(),
            timestamp: "2025-06-10T12:00:00+00:00".to_string(),
            success: true,
            error: None,
            profile: Some(Profile::default()),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"profile\""));
    }
}
