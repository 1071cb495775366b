//! Site fetchers for the two remote readings.
//!
//! Both Just For Today and Spiritual Principle A Day publish today's reading
//! as a single HTML page, so one fetcher type serves both; it only differs by
//! [`Source`] and URL. The page is returned raw and parsed by
//! [`crate::normalize`].

use crate::error::ReadingError;
use crate::models::Source;
use crate::retry::{RetryFetch, RetryPolicy, Sleeper, TokioSleeper};
use crate::scrapers::SourceAdapter;
use crate::scrapers::http::Transport;
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Fetches one remote reading page with bounded retries.
#[derive(Debug)]
pub struct SiteFetcher<T, S = TokioSleeper> {
    source: Source,
    url: String,
    fetch: RetryFetch<T, S>,
}

impl<T: Transport> SiteFetcher<T> {
    /// Create a fetcher for `source` at `url` using the given retry policy.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let jft = SiteFetcher::new(
    ///     Source::JustForToday,
    ///     "https://www.jftna.org/jft/",
    ///     HttpTransport::new()?,
    ///     RetryPolicy::default(),
    /// );
    /// ```
    pub fn new(source: Source, url: impl Into<String>, transport: T, policy: RetryPolicy) -> Self {
        Self {
            source,
            url: url.into(),
            fetch: RetryFetch::new(transport, policy),
        }
    }
}

impl<T: Transport, S: Sleeper> SiteFetcher<T, S> {
    /// Same as [`SiteFetcher::new`] with a custom [`Sleeper`].
    #[cfg(test)]
    pub fn with_sleeper(
        source: Source,
        url: impl Into<String>,
        transport: T,
        policy: RetryPolicy,
        sleeper: S,
    ) -> Self {
        Self {
            source,
            url: url.into(),
            fetch: RetryFetch::with_sleeper(transport, policy, sleeper),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.fetch.policy()
    }
}

impl<T: Transport, S: Sleeper> SourceAdapter for SiteFetcher<T, S> {
    fn source(&self) -> Source {
        self.source
    }

    #[instrument(level = "info", skip_all, fields(source = %self.source, url = %self.url))]
    async fn fetch_raw(&self, _today: NaiveDate) -> Result<String, ReadingError> {
        let body = self.fetch.fetch(&self.url).await?;
        info!(bytes = body.len(), "Fetched reading page");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::tests::{FlakyTransport, RecordingSleeper};
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetcher_retries_then_returns_page() {
        let transport = FlakyTransport::new(1, "<tr><td>page</td></tr>");
        let sleeper = RecordingSleeper::default();
        let fetcher = SiteFetcher::with_sleeper(
            Source::SpiritualPrinciple,
            "https://www.spadna.org/",
            &transport,
            RetryPolicy::new(2, Duration::from_secs(5), Duration::from_secs(10)),
            &sleeper,
        );

        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let body = fetcher.fetch_raw(today).await.unwrap();
        assert_eq!(body, "<tr><td>page</td></tr>");
        assert_eq!(transport.calls(), 2);
        assert_eq!(fetcher.source(), Source::SpiritualPrinciple);
        assert_eq!(fetcher.url(), "https://www.spadna.org/");
    }

    #[test]
    fn test_new_keeps_url_and_policy() {
        let transport = FlakyTransport::new(0, "");
        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(2));
        let fetcher = SiteFetcher::new(
            Source::JustForToday,
            "https://www.jftna.org/jft/",
            &transport,
            policy,
        );
        assert_eq!(fetcher.source(), Source::JustForToday);
        assert_eq!(fetcher.url(), "https://www.jftna.org/jft/");
        assert_eq!(*fetcher.policy(), policy);
    }
}
