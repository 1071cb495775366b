//! Data models for daily readings and the bundle handed to the display layer.
//!
//! - [`Source`]: which provider a reading comes from
//! - [`Reading`]: the normalized six-field record for one source on one date
//! - [`PersistedSnapshot`]: the last known-good reading kept on disk per source
//! - [`ReadingsBundle`]: the per-request output covering all three sources

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three providers of a daily reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Daily Reflection, read from the local archive file.
    DailyReflection,
    /// Just For Today, scraped from its website.
    JustForToday,
    /// Spiritual Principle A Day, scraped from its website.
    SpiritualPrinciple,
}

impl Source {
    /// All sources in bundle order.
    pub const ALL: [Source; 3] = [
        Source::DailyReflection,
        Source::JustForToday,
        Source::SpiritualPrinciple,
    ];

    /// Short stable key used for snapshot file names and log fields.
    pub fn key(self) -> &'static str {
        match self {
            Source::DailyReflection => "dr",
            Source::JustForToday => "jft",
            Source::SpiritualPrinciple => "spad",
        }
    }

    /// Human-readable title, as shown above each reading.
    pub fn title(self) -> &'static str {
        match self {
            Source::DailyReflection => "Daily Reflection",
            Source::JustForToday => "Just For Today",
            Source::SpiritualPrinciple => "Spiritual Principle A Day",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A normalized reading for one source on one date.
///
/// Every field is optional: what is present depends on the source's content
/// and on how much of it could be parsed. A reading with no fields at all is
/// treated as "no reading available" everywhere in the pipeline.
///
/// Absent fields are skipped on serialization so that a snapshot read back
/// from disk keeps the same present/absent shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// The calendar date as printed by the source, e.g. `"October 18"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// The reading's title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    /// The opening quotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    /// Where the quotation is taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_citation: Option<String>,
    /// The body of the reading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    /// The closing affirmation or "Just for Today" line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affirmation: Option<String>,
}

impl Reading {
    /// Number of present fields.
    pub fn field_count(&self) -> usize {
        [
            &self.date,
            &self.heading,
            &self.quote,
            &self.source_citation,
            &self.narrative,
            &self.affirmation,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
    }

    /// `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}

/// Last known-good reading for a source, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub source: Source,
    /// The day the reading was fetched for.
    pub captured_on: NaiveDate,
    pub reading: Reading,
}

/// The combined output of one aggregation: a date plus one entry per source.
///
/// `None` marks a source with no reading available; the display layer renders
/// a placeholder for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingsBundle {
    /// The day the bundle was assembled for.
    pub date: NaiveDate,
    pub daily_reflection: Option<Reading>,
    pub just_for_today: Option<Reading>,
    pub spiritual_principle: Option<Reading>,
}

impl ReadingsBundle {
    /// Entry for one source.
    pub fn get(&self, source: Source) -> Option<&Reading> {
        match source {
            Source::DailyReflection => self.daily_reflection.as_ref(),
            Source::JustForToday => self.just_for_today.as_ref(),
            Source::SpiritualPrinciple => self.spiritual_principle.as_ref(),
        }
    }

    /// Number of sources that have a reading.
    pub fn available(&self) -> usize {
        Source::ALL.iter().filter(|s| self.get(**s).is_some()).count()
    }
}
