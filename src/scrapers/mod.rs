//! Source adapters: where each day's raw reading text comes from.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Daily Reflection | [`archive`] | local file | One archive file covering every day of the year |
//! | Just For Today | [`site`] | HTML scraping | `https://www.jftna.org/jft/` |
//! | Spiritual Principle A Day | [`site`] | HTML scraping | `https://www.spadna.org/` |
//!
//! Adapters only retrieve raw content. Turning it into a
//! [`Reading`](crate::models::Reading) is the job of [`crate::normalize`].

pub mod archive;
pub mod http;
pub mod site;

use crate::error::ReadingError;
use crate::models::Source;
use chrono::NaiveDate;

/// Retrieves raw content for one source.
pub trait SourceAdapter {
    /// Which source this adapter serves.
    fn source(&self) -> Source;

    /// Fetch the raw content for `today`.
    async fn fetch_raw(&self, today: NaiveDate) -> Result<String, ReadingError>;
}

impl<A: SourceAdapter> SourceAdapter for &A {
    fn source(&self) -> Source {
        (**self).source()
    }

    async fn fetch_raw(&self, today: NaiveDate) -> Result<String, ReadingError> {
        (**self).fetch_raw(today).await
    }
}
