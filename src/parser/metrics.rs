//! Engagement counts from the trailing numeric lines of a post block.
//!
//! Nitter renders a post's stats as bare numbers with no labels. The last four
//! numeric lines of a block are read as retweets, quotes, replies, likes, in
//! that order.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:,\d+)*$").expect("valid numeric line regex"));

/// The four engagement counts of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub retweets: u64,
    pub quotes: u64,
    pub replies: u64,
    pub likes: u64,
}

/// Read the trailing run of numeric lines at the end of `block`.
///
/// Needs at least four numeric lines; the last four are used. Trailing blank
/// lines are ignored. Returns `None` when the run is shorter or a number does
/// not fit.
pub fn extract_metrics(block: &str) -> Option<Metrics> {
    let mut run: Vec<&str> = block
        .trim_end()
        .lines()
        .rev()
        .map(|line| line.trim_matches([' ', '\t']))
        .take_while(|line| NUMERIC_LINE.is_match(line))
        .collect();

    if run.len() < 4 {
        return None;
    }
    run.truncate(4);
    run.reverse();

    let counts = run
        .iter()
        .map(|n| n.replace(',', "").parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    Some(Metrics {
        retweets: counts[0],
        quotes: counts[1],
        replies: counts[2],
        likes: counts[3],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_order_is_not_alphabetical() {
        let m = extract_metrics("[Jun 10]\nHello\n5\n2\n1\n10").unwrap();
        assert_eq!(m.retweets, 5);
        assert_eq!(m.quotes, 2);
        assert_eq!(m.replies, 1);
        assert_eq!(m.likes, 10);
    }

    #[test]
    fn test_uses_last_four_of_longer_run() {
        let m = extract_metrics("Hello\n99\n7\n8\n9\n10").unwrap();
        assert_eq!(
            m,
            Metrics {
                retweets: 7,
                quotes: 8,
                replies: 9,
                likes: 10
            }
        );
    }

    #[test]
    fn test_thousands_separators() {
        let m = extract_metrics("Hello\n1,234\n56\n7\n1,000,000").unwrap();
        assert_eq!(m.retweets, 1234);
        assert_eq!(m.likes, 1_000_000);
    }

    #[test]
    fn test_trailing_whitespace_ignored() {
        let m = extract_metrics("Hello\n1\n2\n3\n4\n\n  \n").unwrap();
        assert_eq!(m.likes, 4);
    }

    #[test]
    fn test_spaces_around_numbers() {
        let m = extract_metrics("Hello\n5 \n\t2\n1\n10").unwrap();
        assert_eq!(m.retweets, 5);
        assert_eq!(m.quotes, 2);
    }

    #[test]
    fn test_fewer_than_four_is_none() {
        assert_eq!(extract_metrics("Hello\n1\n2\n3"), None);
        assert_eq!(extract_metrics("Hello"), None);
        assert_eq!(extract_metrics(""), None);
    }

    #[test]
    fn test_run_must_be_contiguous() {
        assert_eq!(extract_metrics("1\n2\nHello\n3\n4"), None);
    }

    #[test]
    fn test_overflow_is_none() {
        assert_eq!(
            extract_metrics("Hello\n1\n2\n3\n99999999999999999999999"),
            None
        );
    }
}
