//! Command-line interface definitions for Nitter Digest.
//!
//! Three subcommands cover the pipeline stages: `parse` for a saved snapshot,
//! `crawl` for live profiles, and `digest` for turning saved crawl results
//! into prompt files.

use crate::parser::DEFAULT_MAX_AGE_DAYS;
use clap::{Parser, Subcommand};

/// Command-line arguments for the Nitter Digest application.
///
/// # Examples
///
/// ```sh
/// # Parse a saved snapshot
/// nitter_digest parse snapshot.md --max-age-days 7
///
/// # Crawl the profiles listed in a config file
/// nitter_digest crawl -c config.yaml -o ./nitter_results
///
/// # Build prompt digests from saved results
/// nitter_digest digest -i ./nitter_results -o ./prompts
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a link-annotated profile snapshot into JSON
    Parse {
        /// Snapshot file, or `-` for stdin
        input: String,

        /// Only keep posts from the last N days
        #[arg(long, default_value_t = DEFAULT_MAX_AGE_DAYS)]
        max_age_days: i64,

        /// Write the profile JSON here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Crawl profiles through Nitter and save the results
    Crawl {
        /// Path to a YAML config file
        #[arg(short, long, env = "NITTER_DIGEST_CONFIG")]
        config: Option<String>,

        /// Extra profile URL to crawl (repeatable)
        #[arg(long = "url")]
        urls: Vec<String>,

        /// Nitter instance to fetch from
        #[arg(long, env = "NITTER_BASE_URL")]
        nitter_base: Option<String>,

        /// Only keep posts from the last N days
        #[arg(long)]
        max_age_days: Option<i64>,

        /// Output directory for result files
        #[arg(short, long)]
        output_dir: String,
    },

    /// Build prompt digests from saved crawl results
    Digest {
        /// A result file, or a directory of `nitter_results_*.json` files
        #[arg(short, long)]
        input: String,

        /// Output directory for prompt files
        #[arg(short, long)]
        output_dir: String,

        /// Only include posts from the last N days
        #[arg(long, default_value_t = DEFAULT_MAX_AGE_DAYS)]
        days: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand_defaults() {
        let cli = Cli::parse_from(["nitter_digest", "parse", "snapshot.md"]);
        match cli.command {
            Command::Parse {
                input,
                max_age_days,
                output,
            } => {
                assert_eq!(input, "snapshot.md");
                assert_eq!(max_age_days, 3);
                assert_eq!(output, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_crawl_repeated_urls_and_short_flags() {
        let cli = Cli::parse_from([
            "nitter_digest",
            "crawl",
            "-c",
            "config.yaml",
            "--url",
            "https://x.com/alice",
            "--url",
            "https://x.com/bob",
            "--max-age-days",
            "7",
            "-o",
            "/tmp/results",
        ]);
        match cli.command {
            Command::Crawl {
                config,
                urls,
                max_age_days,
                output_dir,
                ..
            } => {
                assert_eq!(config.as_deref(), Some("config.yaml"));
                assert_eq!(urls.len(), 2);
                assert_eq!(max_age_days, Some(7));
                assert_eq!(output_dir, "/tmp/results");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_digest_subcommand() {
        let cli = Cli::parse_from([
            "nitter_digest",
            "digest",
            "-i",
            "./nitter_results",
            "-o",
            "./prompts",
            "--days",
            "7",
        ]);
        match cli.command {
            Command::Digest {
                input,
                output_dir,
                days,
            } => {
                assert_eq!(input, "./nitter_results");
                assert_eq!(output_dir, "./prompts");
                assert_eq!(days, 7);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_crawl_requires_output_dir() {
        assert!(Cli::try_parse_from(["nitter_digest", "crawl"]).is_err());
    }
}
