//! Profile scrapers.
//!
//! Only Nitter is supported. A scraper turns a configured profile URL into a
//! [`CrawlRecord`](crate::models::CrawlRecord) and follows the same shape as
//! the rest of the pipeline:
//!
//! 1. **Rewriting**: map the X/Twitter URL onto the Nitter instance
//! 2. **Fetching**: download the profile page
//! 3. **Rendering**: turn the HTML into a link-annotated text snapshot
//! 4. **Parsing**: hand the snapshot to [`crate::parser`]
//!
//! Fetch failures are logged and recorded on the returned record. They never
//! abort a batch.

pub mod nitter;
