//! Utility functions for date labels, log truncation and file system checks.
//!
//! - Date labels in the form the reading sources print them (`"October 18"`)
//! - String truncation for logging
//! - File system validation for output and snapshot directories

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([a-z]+)\s+(\d{1,2})\b").expect("valid month-day regex"));

/// Format a date the way the readings print it: full month name and
/// day without zero padding.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(date_label(NaiveDate::from_ymd_opt(2026, 10, 8).unwrap()), "October 8");
/// ```
pub fn date_label(date: NaiveDate) -> String {
    date.format("%B %-d").to_string()
}

/// Whether a printed date label such as `"October 08"` or
/// `"Saturday, October 18"` names the same month and day as `date`.
///
/// Returns `false` when no month/day pair can be recognized.
pub fn same_day(label: &str, date: NaiveDate) -> bool {
    MONTH_DAY.captures_iter(label).any(|caps| {
        let month = month_number(&caps[1]);
        let day = caps[2].parse::<u32>().ok();
        month == Some(date.month()) && day == Some(date.day())
    })
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary) with
/// an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn test_date_label_has_no_zero_padding() {
        assert_eq!(date_label(day(10, 8)), "October 8");
        assert_eq!(date_label(day(1, 31)), "January 31");
    }

    #[test]
    fn test_same_day_accepts_padding_and_prefixes() {
        assert!(same_day("October 08", day(10, 8)));
        assert!(same_day("october 8", day(10, 8)));
        assert!(same_day("Saturday, October 18", day(10, 18)));
        assert!(!same_day("October 17", day(10, 18)));
        assert!(!same_day("September 18", day(10, 18)));
        assert!(!same_day("no date here", day(10, 18)));
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // The en dash is three bytes; cutting inside it must not panic.
        let result = truncate_for_log("a–b", 2);
        assert_eq!(result, "a…(+4 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested_dirs() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("out/json");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
