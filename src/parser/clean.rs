//! Post text cleaning as an ordered pipeline of regex stages.
//!
//! Each [`CleanStage`] is a single pure string transform. [`clean_post_text`]
//! applies [`STAGES`] left to right and trims the result. Order matters: the
//! generic titled-link stage also consumes most mention and permalink
//! annotations, and the metric stages only see the tail once links are gone.

use once_cell::sync::Lazy;
use regex::Regex;

/// A named regex replacement.
#[derive(Debug)]
pub struct CleanStage {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl CleanStage {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        CleanStage {
            name,
            pattern: Regex::new(pattern).expect("valid clean stage regex"),
            replacement,
        }
    }

    /// Apply this stage to `text`.
    pub fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement).into_owned()
    }
}

/// The cleaning stages in application order.
pub static STAGES: Lazy<Vec<CleanStage>> = Lazy::new(|| {
    vec![
        // [![](avatar)](profile)
        CleanStage::new("profile_image", r"\[!\[\]\([^)]+\)\]\([^)]+\)", ""),
        // [Name](url "title")
        CleanStage::new("profile_link", r#"\[[^\]]+\]\([^)]+\s+"[^"]+"\)"#, ""),
        CleanStage::new("mention_link", r#"\[@[^\]]+\]\([^)]+\s+"@[^"]+"\)"#, ""),
        CleanStage::new("date_permalink", r#"\[[^\]]+\]\([^)]+#m\s+"[^"]+"\)"#, ""),
        // bare [Mon D] line left by the renderer
        CleanStage::new(
            "date_token",
            r"(?m)^\[(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2}\][ \t]*$",
            "",
        ),
        CleanStage::new(
            "status_permalink",
            r"\[\]\((?:https://nitter\.net/[^)]+|https?://[^)\s]+/status/[^)]*)\)",
            "",
        ),
        CleanStage::new(
            "trailing_metrics",
            r"\n[ \t]*\d+(?:,\d+)*[ \t]*(?:\n[ \t]*\d+(?:,\d+)*[ \t]*){3}\s*$",
            "",
        ),
        CleanStage::new("trailing_number", r"\n[ \t]*\d+(?:,\d+)*\s*$", ""),
        CleanStage::new("blank_lines", r"\n+", "\n"),
    ]
});

/// Run every stage over `text` and trim the result.
pub fn clean_post_text(text: &str) -> String {
    STAGES
        .iter()
        .fold(text.to_string(), |acc, stage| stage.apply(&acc))
        .trim()
        .to_string()
}
