//! Nitter profile scraper.
//!
//! Profiles are configured as X/Twitter URLs and fetched from a Nitter
//! instance (by default [nitter.net](https://nitter.net)). Each page is
//! rendered into a link-annotated text snapshot and handed to
//! [`crate::parser`].
//!
//! # Snapshot layout
//!
//! ```text
//! [Alice](https://nitter.net/alice "Alice") [@alice](https://nitter.net/alice "@alice")
//! Bio: Curious about rabbit holes.
//! [Jun 10]
//! [![](https://nitter.net/pic/a.jpg)](https://nitter.net/alice) ...
//! Post body with [links](https://example.com)
//! [](https://nitter.net/alice/status/123#m)
//! 5
//! 2
//! 1
//! 10
//! ```
//!
//! The trailing numbers of each post are written as retweets, quotes, replies,
//! likes, which is the order [`crate::parser::metrics`] reads them back in.

use crate::models::CrawlRecord;
use crate::outputs::json;
use crate::parser::{self, dates};
use crate::utils::truncate_for_log;
use chrono::Local;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; nitter_digest/0.1)";

/// Partial results are saved after every this many crawled profiles.
pub const CHECKPOINT_EVERY: usize = 5;

/// Hosts rewritten to the Nitter instance.
const TWITTER_HOSTS: [&str; 6] = [
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
    "x.com",
    "www.x.com",
    "mobile.x.com",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

static FULLNAME: Lazy<Selector> = Lazy::new(|| selector(".profile-card-fullname"));
static USERNAME: Lazy<Selector> = Lazy::new(|| selector(".profile-card-username"));
static BIO: Lazy<Selector> = Lazy::new(|| selector(".profile-bio"));
static TIMELINE_ITEM: Lazy<Selector> = Lazy::new(|| selector(".timeline-item"));
static RETWEET_HEADER: Lazy<Selector> = Lazy::new(|| selector(".retweet-header"));
static TWEET_DATE: Lazy<Selector> = Lazy::new(|| selector(".tweet-date a"));
static TWEET_LINK: Lazy<Selector> = Lazy::new(|| selector("a.tweet-link"));
static TWEET_CONTENT: Lazy<Selector> = Lazy::new(|| selector(".tweet-content"));
static TWEET_STATS: Lazy<Selector> = Lazy::new(|| selector(".tweet-stats"));
static TWEET_STAT: Lazy<Selector> = Lazy::new(|| selector(".tweet-stat"));
static ICON: Lazy<Selector> = Lazy::new(|| selector(r#"span[class^="icon-"]"#));

/// Rewrite an X/Twitter profile URL to the given Nitter instance.
///
/// Path and query are kept. URLs on any other host, or that fail to parse,
/// are returned unchanged.
pub fn to_nitter_url(url: &str, base: &Url) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    match parsed.host_str() {
        Some(host) if TWITTER_HOSTS.contains(&host) => {
            let mut rewritten = base.clone();
            rewritten.set_path(parsed.path());
            rewritten.set_query(parsed.query());
            rewritten.to_string()
        }
        _ => url.to_string(),
    }
}

/// Build the HTTP client used for every profile fetch.
///
/// # Arguments
///
/// * `timeout` - Per-request timeout, covering connect and body.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<Client, Box<dyn Error>> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Fetch the raw HTML of one Nitter page.
///
/// # Errors
///
/// Returns an error on connection failure, timeout, or a non-success status.
#[instrument(level = "info", skip(client))]
pub async fn fetch_profile_html(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    let response = client.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;
    debug!(bytes = html.len(), "Fetched Nitter page");
    Ok(html)
}

/// Crawl all `urls` one after another.
///
/// Failures are recorded per URL and never stop the batch. When
/// `checkpoint_dir` is set, the records gathered so far are written to
/// [`json::CHECKPOINT_FILE`] after every [`CHECKPOINT_EVERY`] profiles, so an
/// interrupted run keeps its partial results.
///
/// # Arguments
///
/// * `client` - Shared HTTP client from [`build_client`].
/// * `urls` - Profile URLs, crawled in order.
/// * `base` - Nitter instance the URLs are rewritten to.
/// * `max_age_days` - Recency window passed to the parser.
/// * `checkpoint_dir` - Directory for the checkpoint file, if any.
///
/// # Returns
///
/// One [`CrawlRecord`] per URL, in input order.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn crawl_profiles(
    client: &Client,
    urls: &[String],
    base: &Url,
    max_age_days: i64,
    checkpoint_dir: Option<&str>,
) -> Vec<CrawlRecord> {
    let mut crawled =
        std::pin::pin!(stream::iter(urls).then(|url| crawl_profile(client, url, base, max_age_days)));

    let mut records: Vec<CrawlRecord> = Vec::with_capacity(urls.len());
    while let Some(record) = crawled.next().await {
        records.push(record);
        if let Some(dir) = checkpoint_dir {
            if records.len() % CHECKPOINT_EVERY == 0 {
                if let Err(e) = json::write_checkpoint(&records, dir).await {
                    warn!(error = %e, done = records.len(), "Failed to save checkpoint");
                }
            }
        }
    }

    let failed = records.iter().filter(|r| !r.success).count();
    info!(
        total = records.len(),
        successful = records.len() - failed,
        failed,
        "Finished crawling profiles"
    );
    records
}

/// Fetch, render and parse a single profile.
///
/// Never fails: a fetch error is logged and comes back as a record with
/// `success = false`, the error message set and no profile.
#[instrument(level = "info", skip(client, base))]
pub async fn crawl_profile(
    client: &Client,
    url: &str,
    base: &Url,
    max_age_days: i64,
) -> CrawlRecord {
    let nitter_url = to_nitter_url(url, base);
    let timestamp = Local::now().to_rfc3339();

    match fetch_profile_html(client, &nitter_url).await {
        Ok(html) => {
            let snapshot = render_snapshot(&html, base);
            let profile = parser::parse(&snapshot, max_age_days);
            if let Some(latest) = profile.tweets.first() {
                debug!(preview = %truncate_for_log(&latest.text, 100), "Latest post");
            }
            info!(%nitter_url, count = profile.tweets.len(), "Crawled profile");
            CrawlRecord {
                url: url.to_string(),
                nitter_url,
                timestamp,
                success: true,
                error: None,
                profile: Some(profile),
            }
        }
        Err(e) => {
            error!(error = %e, %nitter_url, "Nitter fetch failed");
            CrawlRecord {
                url: url.to_string(),
                nitter_url,
                timestamp,
                success: false,
                error: Some(e.to_string()),
                profile: None,
            }
        }
    }
}

/// Render a Nitter profile page as a link-annotated snapshot.
///
/// Retweets are left out; only the profile's own posts are rendered.
///
/// # Arguments
///
/// * `html` - Full page HTML.
/// * `base` - Nitter instance used to resolve relative links.
///
/// # Returns
///
/// The snapshot text, in the layout shown in the module docs.
pub fn render_snapshot(html: &str, base: &Url) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<String> = Vec::new();

    let fullname = document.select(&FULLNAME).next();
    let username = document.select(&USERNAME).next();
    match (fullname, username) {
        (Some(full), Some(user)) => {
            lines.push(format!("{} {}", anchor(full, base), anchor(user, base)))
        }
        (None, Some(user)) => lines.push(anchor(user, base)),
        _ => {}
    }

    if let Some(bio) = document.select(&BIO).next() {
        let text = collapse_whitespace(&inline_text(bio, base));
        if !text.is_empty() {
            lines.push(format!("Bio: {text}"));
        }
    }

    for item in document.select(&TIMELINE_ITEM) {
        if item.select(&RETWEET_HEADER).next().is_some() {
            debug!("Skipping retweet");
            continue;
        }
        if let Some(block) = render_item(item, base) {
            lines.push(block);
        }
    }

    lines.join("\n")
}

fn render_item(item: ElementRef<'_>, base: &Url) -> Option<String> {
    let date = item.select(&TWEET_DATE).next()?;
    let token = date
        .value()
        .attr("title")
        .and_then(date_token)
        .or_else(|| date_token(&date.text().collect::<String>()))?;

    let mut lines = vec![format!("[{token}]")];

    if let Some(content) = item.select(&TWEET_CONTENT).next() {
        let text = normalize_lines(&inline_text(content, base));
        if !text.is_empty() {
            lines.push(text);
        }
    }

    if let Some(href) = item
        .select(&TWEET_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
    {
        lines.push(format!("[]({})", resolve(base, href)));
    }

    if let Some(stats) = item.select(&TWEET_STATS).next() {
        let counts = read_stats(stats);
        lines.extend([counts.retweets, counts.quotes, counts.replies, counts.likes]);
    }

    Some(lines.join("\n"))
}

/// `Mon D` from either a date title (`Jun 10, 2025 · 10:58 PM UTC`) or the
/// visible label (`Jun 10`).
fn date_token(raw: &str) -> Option<String> {
    let head = raw.split([',', '·']).next()?.trim();
    let mut parts = head.split_whitespace();
    let month = parts.next()?;
    let day = parts.next()?;
    if parts.next().is_some() || dates::month_number(month).is_none() {
        return None;
    }
    let day: u32 = day.parse().ok()?;
    Some(format!("{month} {day}"))
}

#[derive(Debug, Default)]
struct StatCounts {
    retweets: String,
    quotes: String,
    replies: String,
    likes: String,
}

fn read_stats(stats: ElementRef<'_>) -> StatCounts {
    let mut counts = StatCounts::default();
    for stat in stats.select(&TWEET_STAT) {
        let value: String = stat
            .text()
            .collect::<String>()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == ',')
            .collect();
        let value = value.trim_matches(',').to_string();

        let kind = stat
            .select(&ICON)
            .flat_map(|icon| icon.value().classes())
            .find(|class| {
                matches!(
                    *class,
                    "icon-retweet" | "icon-quote" | "icon-comment" | "icon-heart"
                )
            });
        match kind {
            Some("icon-retweet") => counts.retweets = value,
            Some("icon-quote") => counts.quotes = value,
            Some("icon-comment") => counts.replies = value,
            Some("icon-heart") => counts.likes = value,
            _ => {}
        }
    }

    for field in [
        &mut counts.retweets,
        &mut counts.quotes,
        &mut counts.replies,
        &mut counts.likes,
    ] {
        if field.is_empty() {
            field.push('0');
        }
    }
    counts
}

fn resolve(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// `[label](href "title")`, with the title left out when absent.
fn anchor(el: ElementRef<'_>, base: &Url) -> String {
    let label = collapse_whitespace(&inline_text(el, base));
    let href = el
        .value()
        .attr("href")
        .map(|h| resolve(base, h))
        .unwrap_or_default();
    match el.value().attr("title").map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("[{label}]({href} \"{}\")", title.replace('"', "'")),
        None => format!("[{label}]({href})"),
    }
}

fn inline_text(el: ElementRef<'_>, base: &Url) -> String {
    let mut out = String::new();
    push_inline(el, base, &mut out);
    out
}

fn push_inline(el: ElementRef<'_>, base: &Url, out: &mut String) {
    for child in el.children() {
        match child.value() {
            // source newlines are layout, not content
            Node::Text(text) => out.push_str(&text.replace(['\n', '\r', '\t'], " ")),
            Node::Element(element) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match element.name() {
                    "a" => out.push_str(&anchor(child_el, base)),
                    "img" => {
                        if let Some(src) = element.attr("src") {
                            out.push_str(&format!("![]({})", resolve(base, src)));
                        }
                    }
                    "br" => out.push('\n'),
                    "script" | "style" => {}
                    "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "blockquote" => {
                        out.push('\n');
                        push_inline(child_el, base, out);
                        out.push('\n');
                    }
                    _ => push_inline(child_el, base, out),
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

fn normalize_lines(s: &str) -> String {
    s.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .join("\n")
}
