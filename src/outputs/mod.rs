//! Output generation.
//!
//! - [`json`]: crawl result files, failed-URL lists, parsed profiles and
//!   prompt digests
//!
//! Prompt digests are built in [`crate::digest`]; this module only writes them.

pub mod json;
