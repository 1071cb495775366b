//! Error types for the reading pipeline.
//!
//! [`ReadingError`] is what a source pipeline can fail with; the aggregator
//! treats every variant the same way (fall back to the persisted snapshot).
//! [`FetchError`] describes a single failed network attempt and only escapes
//! the retry helper wrapped in [`ReadingError::Fetch`].

use crate::models::Source;
use chrono::NaiveDate;
use thiserror::Error;

/// Failure of one network attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("connection error: {0}")]
    Connection(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Connection(e.to_string())
        }
    }
}

/// Failure to produce a reading for one source.
#[derive(Debug, Error)]
pub enum ReadingError {
    /// All attempts against a remote source failed.
    #[error("fetching {url} failed after {attempts} attempt(s)")]
    Fetch {
        url: String,
        attempts: u32,
        #[source]
        cause: FetchError,
    },
    /// The local archive has nothing for the requested date. Never retried.
    #[error("no {origin} reading for {date}: {reason}")]
    NotFound {
        origin: Source,
        date: NaiveDate,
        reason: String,
    },
    /// Normalization extracted zero fields.
    #[error("no usable fields in {origin} content")]
    Parse { origin: Source },
    /// The caller's deadline passed before the source answered.
    #[error("{origin} did not answer before the deadline")]
    DeadlineExceeded { origin: Source },
    /// The source served a reading for another day.
    #[error("{origin} content is dated {found:?}, expected {expected:?}")]
    DateMismatch {
        origin: Source,
        found: String,
        expected: String,
    },
}

/// Failure of the on-disk snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("refusing to persist an empty {0} reading")]
    EmptyReading(Source),
}

/// Failure to load or validate configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid YAML in config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
