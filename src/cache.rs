//! In-memory cache of normalized readings, keyed by source and calendar date.
//!
//! Entries expire a fixed window after they were stored, independently of the
//! date key. Expiry is checked lazily on `get`; nothing sweeps in the
//! background. An expiry of zero makes every lookup a miss.

use crate::models::{Reading, Source};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    reading: Reading,
    stored_at: Instant,
}

/// Shared cache instance; construct once and hand it to the aggregator.
#[derive(Debug)]
pub struct ReadingCache {
    entries: RwLock<HashMap<(Source, NaiveDate), CacheEntry>>,
    expiry: Duration,
}

impl ReadingCache {
    pub fn new(expiry: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            expiry,
        }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Cached reading for `source` on `date`, if stored less than the expiry
    /// window ago.
    pub fn get(&self, source: Source, date: NaiveDate) -> Option<Reading> {
        self.get_at(source, date, Instant::now())
    }

    pub(crate) fn get_at(&self, source: Source, date: NaiveDate, now: Instant) -> Option<Reading> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(&(source, date))?;
        let age = now.saturating_duration_since(entry.stored_at);
        if age < self.expiry {
            Some(entry.reading.clone())
        } else {
            debug!(%source, %date, ?age, "Cache entry expired");
            None
        }
    }

    /// Store `reading` for `source` on `date`, replacing any previous entry.
    ///
    /// Entries of the same source for other dates are dropped. Empty readings
    /// are never cached.
    pub fn put(&self, source: Source, date: NaiveDate, reading: Reading) {
        self.put_at(source, date, reading, Instant::now());
    }

    pub(crate) fn put_at(&self, source: Source, date: NaiveDate, reading: Reading, now: Instant) {
        if reading.is_empty() {
            debug!(%source, %date, "Not caching empty reading");
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|(s, d), _| *s != source || *d == date);
        entries.insert(
            (source, date),
            CacheEntry {
                reading,
                stored_at: now,
            },
        );
    }

    /// Number of stored entries, expired or not.
    pub(crate) fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn reading(heading: &str) -> Reading {
        Reading {
            heading: Some(heading.to_string()),
            ..Reading::default()
        }
    }

    #[test]
    fn test_hit_within_window() {
        let cache = ReadingCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.put_at(Source::JustForToday, day(18), reading("a"), t0);
        let got = cache.get_at(Source::JustForToday, day(18), t0 + Duration::from_secs(299));
        assert_eq!(got, Some(reading("a")));
    }

    #[test]
    fn test_miss_after_window_even_for_same_date() {
        let cache = ReadingCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.put_at(Source::JustForToday, day(18), reading("a"), t0);
        let got = cache.get_at(Source::JustForToday, day(18), t0 + Duration::from_secs(300));
        assert_eq!(got, None);
    }

    #[test]
    fn test_zero_expiry_always_misses() {
        let cache = ReadingCache::new(Duration::ZERO);
        cache.put(Source::DailyReflection, day(18), reading("a"));
        assert_eq!(cache.get(Source::DailyReflection, day(18)), None);
    }

    #[test]
    fn test_keys_are_per_source_and_date() {
        let cache = ReadingCache::new(Duration::from_secs(60));
        cache.put(Source::JustForToday, day(18), reading("jft"));
        cache.put(Source::SpiritualPrinciple, day(18), reading("spad"));
        assert_eq!(cache.get(Source::JustForToday, day(18)), Some(reading("jft")));
        assert_eq!(cache.get(Source::JustForToday, day(19)), None);
        assert_eq!(cache.get(Source::DailyReflection, day(18)), None);
    }

    #[test]
    fn test_new_date_replaces_old_entries_for_source() {
        let cache = ReadingCache::new(Duration::from_secs(60));
        cache.put(Source::JustForToday, day(17), reading("old"));
        cache.put(Source::SpiritualPrinciple, day(17), reading("other"));
        cache.put(Source::JustForToday, day(18), reading("new"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(Source::JustForToday, day(17)), None);
        assert_eq!(
            cache.get(Source::SpiritualPrinciple, day(17)),
            Some(reading("other"))
        );
    }

    #[test]
    fn test_empty_reading_is_not_cached() {
        let cache = ReadingCache::new(Duration::from_secs(60));
        cache.put(Source::JustForToday, day(18), Reading::default());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_concurrent_puts_last_wins() {
        let cache = Arc::new(ReadingCache::new(Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        cache.put(Source::JustForToday, day(18), reading(&i.to_string()));
                        let _ = cache.get(Source::JustForToday, day(18));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        cache.put(Source::JustForToday, day(18), reading("final"));
        assert_eq!(cache.get(Source::JustForToday, day(18)), Some(reading("final")));
        assert_eq!(cache.len(), 1);
    }
}
