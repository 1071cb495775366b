//! Assemble the three daily readings into one [`ReadingsBundle`].
//!
//! For each source, independently and concurrently:
//!
//! 1. Return the cached reading for today if it is still fresh.
//! 2. Otherwise fetch through the source's adapter and normalize; on success
//!    cache it, persist a snapshot and use it.
//! 3. On any failure fall back to the last persisted snapshot, whatever day it
//!    was captured on.
//! 4. With no snapshot either, the source is absent from the bundle.
//!
//! A failing source never affects the others and never fails the call. The
//! aggregator itself does not retry; that is the site fetchers' job.

use crate::cache::ReadingCache;
use crate::error::ReadingError;
use crate::models::{Reading, ReadingsBundle};
use crate::normalize::normalize;
use crate::scrapers::SourceAdapter;
use crate::store::SnapshotStore;
use crate::utils::{date_label, same_day};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout_at;
use tracing::{debug, error, info, instrument, warn};

/// Where a bundle entry came from. Logged only; the display layer never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Cache,
    Live,
    Stale,
    Missing,
}

/// Runs the cache → fetch → fallback policy for the three sources.
#[derive(Debug)]
pub struct Aggregator<D, J, S> {
    daily_reflection: D,
    just_for_today: J,
    spiritual_principle: S,
    cache: Arc<ReadingCache>,
    store: Arc<SnapshotStore>,
    deadline: Option<Duration>,
}

impl<D, J, S> Aggregator<D, J, S>
where
    D: SourceAdapter,
    J: SourceAdapter,
    S: SourceAdapter,
{
    pub fn new(
        daily_reflection: D,
        just_for_today: J,
        spiritual_principle: S,
        cache: Arc<ReadingCache>,
        store: Arc<SnapshotStore>,
    ) -> Self {
        Self {
            daily_reflection,
            just_for_today,
            spiritual_principle,
            cache,
            store,
            deadline: None,
        }
    }

    /// Bound the live fetch of every source in one [`assemble`](Self::assemble)
    /// call to `deadline` from its start. Sources still fetching when it passes
    /// fall back exactly as if their fetch had failed.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Build today's bundle.
    #[instrument(level = "info", skip(self))]
    pub async fn assemble(&self, today: NaiveDate) -> ReadingsBundle {
        let t0 = Instant::now();
        let deadline = self.deadline.map(|d| tokio::time::Instant::now() + d);

        let (dr, jft, spad) = tokio::join!(
            self.resolve(&self.daily_reflection, today, deadline),
            self.resolve(&self.just_for_today, today, deadline),
            self.resolve(&self.spiritual_principle, today, deadline),
        );

        info!(
            dr = ?dr.1,
            jft = ?jft.1,
            spad = ?spad.1,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Assembled readings bundle"
        );

        ReadingsBundle {
            date: today,
            daily_reflection: dr.0,
            just_for_today: jft.0,
            spiritual_principle: spad.0,
        }
    }

    /// Resolve one source to a reading (or absence) and where it came from.
    #[instrument(level = "info", skip_all, fields(source = %adapter.source()))]
    pub(crate) async fn resolve<A: SourceAdapter>(
        &self,
        adapter: &A,
        today: NaiveDate,
        deadline: Option<tokio::time::Instant>,
    ) -> (Option<Reading>, Provenance) {
        let source = adapter.source();

        if let Some(reading) = self.cache.get(source, today) {
            debug!("Cache hit");
            return (Some(reading), Provenance::Cache);
        }

        let live = match deadline {
            Some(at) => match timeout_at(at, fetch_live(adapter, today)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Deadline passed before the source answered");
                    Err(ReadingError::DeadlineExceeded { origin: source })
                }
            },
            None => fetch_live(adapter, today).await,
        };

        match live {
            Ok(reading) => {
                self.cache.put(source, today, reading.clone());
                if let Err(e) = self.store.save(source, &reading, today).await {
                    error!(error = %e, "Failed to persist snapshot; using live reading anyway");
                }
                (Some(reading), Provenance::Live)
            }
            Err(e) => {
                warn!(error = %e, "Live reading unavailable; trying snapshot");
                match self.store.load(source).await {
                    Ok(Some(snapshot)) => {
                        warn!(captured_on = %snapshot.captured_on, "Serving stale snapshot");
                        (Some(snapshot.reading), Provenance::Stale)
                    }
                    Ok(None) => {
                        warn!("No snapshot available; source will be absent");
                        (None, Provenance::Missing)
                    }
                    Err(e) => {
                        error!(error = %e, "Snapshot unreadable; source will be absent");
                        (None, Provenance::Missing)
                    }
                }
            }
        }
    }
}

/// Fetch, normalize and date-check one source.
async fn fetch_live<A: SourceAdapter>(
    adapter: &A,
    today: NaiveDate,
) -> Result<Reading, ReadingError> {
    let source = adapter.source();
    let raw = adapter.fetch_raw(today).await?;
    let reading = normalize(source, &raw)?;

    if let Some(found) = reading.date.as_deref() {
        if !same_day(found, today) {
            return Err(ReadingError::DateMismatch {
                origin: source,
                found: found.to_string(),
                expected: date_label(today),
            });
        }
    }
    Ok(reading)
}
