//! Daily Reflection reader for the local archive file.
//!
//! The archive is a single text file holding every day of the year. Each day
//! starts with a marker line such as `_*October 8*_` (full month name, day
//! without zero padding) and runs until the next day's marker.

use crate::error::ReadingError;
use crate::models::Source;
use crate::scrapers::SourceAdapter;
use crate::utils::date_label;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Any day marker, used to find where a day's section ends.
static DAY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_\*[A-Z][a-z]+ \d{1,2}\*_").expect("valid day marker regex"));

/// Reads the Daily Reflection for a date from the archive file.
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    path: PathBuf,
}

impl ArchiveReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Cut the section for `today` out of the full archive text.
///
/// Returns `None` when the day's marker is missing or its section is empty.
pub fn extract_day(contents: &str, today: NaiveDate) -> Option<&str> {
    let marker = format!("_*{}*_", date_label(today));
    let start = contents.find(&marker)?;
    let after_marker = start + marker.len();
    let end = DAY_MARKER
        .find_at(contents, after_marker)
        .map(|m| m.start())
        .unwrap_or(contents.len());

    let section = contents[start..end].trim();
    (section.len() > marker.len()).then_some(section)
}

impl SourceAdapter for ArchiveReader {
    fn source(&self) -> Source {
        Source::DailyReflection
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), %today))]
    async fn fetch_raw(&self, today: NaiveDate) -> Result<String, ReadingError> {
        let not_found = |reason: String| ReadingError::NotFound {
            origin: Source::DailyReflection,
            date: today,
            reason,
        };

        let contents = fs::read_to_string(&self.path)
            .await
            .map_err(|e| not_found(format!("cannot read archive: {e}")))?;

        let section = extract_day(&contents, today)
            .ok_or_else(|| not_found(format!("no entry for {}", date_label(today))))?;

        info!(bytes = section.len(), "Read Daily Reflection from archive");
        debug!(preview = %crate::utils::truncate_for_log(section, 120), "Archive section");
        Ok(section.to_string())
    }
}
