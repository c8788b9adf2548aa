//! Month/day date tokens and the recency cutoff.
//!
//! Nitter labels posts with a year-less `Mon D` token. A token is resolved to
//! the most recent past occurrence of that month and day: a month later than
//! the current one belongs to the previous year.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};

/// English month abbreviations in calendar order.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Month number (1-12) for an abbreviation such as `Jun`.
pub fn month_number(abbrev: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == abbrev)
        .map(|i| i as u32 + 1)
}

/// Resolve a `Mon D` token against `now`.
///
/// Returns `None` for unknown months, malformed days, or dates that do not
/// exist in the resolved year (`Feb 29` outside a leap year).
pub fn resolve_date(token: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let mut parts = token.split_whitespace();
    let month = month_number(parts.next()?)?;
    let day: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let mut year = now.year();
    if month > now.month() {
        year -= 1;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whether the post dated `token` falls on or after `now - days`.
///
/// The resolved date is taken at midnight, so the boundary is inclusive only
/// when `now` itself sits at midnight. Tokens that cannot be resolved are
/// never recent.
pub fn is_within_days(token: &str, days: i64, now: NaiveDateTime) -> bool {
    let Some(date) = resolve_date(token, now) else {
        return false;
    };
    let Some(posted) = date.and_hms_opt(0, 0, 0) else {
        return false;
    };

    match TimeDelta::try_days(days).and_then(|d| now.checked_sub_signed(d)) {
        Some(cutoff) => posted >= cutoff,
        // cutoff falls outside the representable range
        None => days > 0,
    }
}
