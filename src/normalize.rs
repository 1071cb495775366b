//! Turn raw source content into a [`Reading`].
//!
//! Two content shapes exist:
//!
//! - **Plain text** (Daily Reflection): WhatsApp-style emphasis markup, where
//!   `_*October 18*_` is the date, `*…*` spans are bold and `_…_` spans italic.
//! - **Table page** (Just For Today, Spiritual Principle A Day): an HTML page
//!   whose `<tr>` rows each carry one part of the reading in their first `<td>`.
//!
//! Extraction is best-effort per field: anything missing or unrecognizable
//! becomes `None`. Only when no field at all can be extracted does
//! [`normalize`] fail with [`ReadingError::Parse`].

use crate::error::ReadingError;
use crate::models::{Reading, Source};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};
use tracing::{debug, instrument, warn};

static DATE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"_\*([^*]+)\*_").expect("valid regex"));
static BOLD_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
static ITALIC_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([^_]+)_").expect("valid regex"));
static CITATION_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\s*[–-]\s*([^*]+)\*").expect("valid regex"));
static LEADING_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[–-]\s*").expect("valid regex"));
static INLINE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static ANY_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static TRAILING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",?\s*\d{4}\s*$").expect("valid regex"));

/// Which table row holds which field on a reading page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub date: usize,
    pub heading: usize,
    pub quote: usize,
    pub citation: usize,
    /// Rows joined by a blank line to form the narrative.
    pub narrative: &'static [usize],
    pub affirmation: usize,
}

/// Just For Today: a single narrative row followed by the "Just for Today" line.
pub const JFT_LAYOUT: TableLayout = TableLayout {
    date: 0,
    heading: 1,
    quote: 3,
    citation: 4,
    narrative: &[5],
    affirmation: 6,
};

/// Spiritual Principle A Day: two narrative rows, then the closing thought.
pub const SPAD_LAYOUT: TableLayout = TableLayout {
    date: 0,
    heading: 1,
    quote: 3,
    citation: 4,
    narrative: &[5, 6],
    affirmation: 7,
};

/// The content shape a source delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    PlainText,
    TablePage(TableLayout),
}

/// The shape of each source's raw content.
pub fn shape_of(source: Source) -> Shape {
    match source {
        Source::DailyReflection => Shape::PlainText,
        Source::JustForToday => Shape::TablePage(JFT_LAYOUT),
        Source::SpiritualPrinciple => Shape::TablePage(SPAD_LAYOUT),
    }
}

/// Normalize raw content from `source` into a [`Reading`].
///
/// # Errors
///
/// [`ReadingError::Parse`] when not a single field could be extracted.
#[instrument(level = "debug", skip(raw), fields(bytes = raw.len()))]
pub fn normalize(source: Source, raw: &str) -> Result<Reading, ReadingError> {
    let reading = match shape_of(source) {
        Shape::PlainText => parse_plain_text(raw),
        Shape::TablePage(layout) => parse_table_page(raw, &layout),
    };

    if reading.is_empty() {
        warn!(%source, "No fields extracted from content");
        return Err(ReadingError::Parse { origin: source });
    }
    debug!(%source, fields = reading.field_count(), "Normalized reading");
    Ok(reading)
}

/// Trimmed text, or `None` when nothing is left.
fn present(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Strip a leading dash and collapse runs of spaces and tabs, keeping line breaks.
fn clean_block(s: &str) -> Option<String> {
    let s = LEADING_DASH.replace(s, "");
    present(&INLINE_WS.replace_all(&s, " "))
}

/// Parse WhatsApp-style emphasis markup.
pub fn parse_plain_text(content: &str) -> Reading {
    let date_match = DATE_SPAN.captures(content).and_then(|c| c.get(0));
    let date = DATE_SPAN
        .captures(content)
        .and_then(|c| c.get(1))
        .and_then(|m| present(m.as_str()));

    let citation_match = CITATION_SPAN.captures(content);
    let citation_end = citation_match
        .as_ref()
        .and_then(|c| c.get(0))
        .map(|m| m.end());
    let source_citation = citation_match
        .as_ref()
        .and_then(|c| c.get(1))
        .and_then(|m| present(m.as_str()));

    // Bold spans; with a date the first one is the date itself.
    let bold: Vec<regex::Match> = BOLD_SPAN
        .captures_iter(content)
        .filter_map(|c| c.get(0))
        .collect();
    let skip = usize::from(date_match.is_some());
    let heading_span = bold
        .get(skip)
        .filter(|m| !CITATION_SPAN.is_match(m.as_str()))
        .copied();
    let heading = heading_span.and_then(|m| present(m.as_str().trim_matches('*')));

    // The quote is the first italic span after the heading (or the date).
    let quote_from = heading_span
        .map(|m| m.end())
        .or(date_match.map(|m| m.end()))
        .unwrap_or(0);
    let quote = ITALIC_SPAN
        .captures(&content[quote_from..])
        .and_then(|c| c.get(1))
        .filter(|m| citation_end.is_none_or(|end| quote_from + m.start() < end))
        .and_then(|m| present(m.as_str()));

    // The affirmation is the last bold span, and only once it follows the citation.
    let affirmation_span = bold
        .last()
        .filter(|m| citation_end.is_some_and(|end| m.start() >= end))
        .copied();
    let affirmation = affirmation_span.and_then(|m| present(m.as_str().trim_matches('*')));

    let narrative = citation_end.and_then(|start| {
        let end = affirmation_span.map(|m| m.start()).unwrap_or(content.len());
        (end > start).then(|| &content[start..end]).and_then(clean_block)
    });

    Reading {
        date,
        heading,
        quote,
        source_citation,
        narrative,
        affirmation,
    }
}

/// Collect the first `<td>` of every `<tr>`, with `<br>` as line breaks.
///
/// Rows without a cell yield an empty string so indices stay aligned.
pub fn table_rows(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr").expect("valid selector");
    let cell_selector = Selector::parse("td").expect("valid selector");

    document
        .select(&row_selector)
        .map(|row| {
            let Some(cell) = row.select(&cell_selector).next() else {
                return String::new();
            };
            let mut text = String::new();
            for node in cell.descendants() {
                match node.value() {
                    Node::Text(t) => text.push_str(&ANY_WS.replace_all(t, " ")),
                    Node::Element(el) if el.name() == "br" => text.push('\n'),
                    _ => {}
                }
            }
            text.lines()
                .map(str::trim)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .collect()
}

/// Parse a reading page laid out as table rows.
pub fn parse_table_page(html: &str, layout: &TableLayout) -> Reading {
    let rows = table_rows(html);
    let row = |i: usize| rows.get(i).and_then(|r| present(r));

    let narrative = layout
        .narrative
        .iter()
        .filter_map(|i| row(*i))
        .collect::<Vec<_>>();

    Reading {
        date: row(layout.date).and_then(|d| present(&TRAILING_YEAR.replace(&d, ""))),
        heading: row(layout.heading),
        quote: row(layout.quote),
        source_citation: row(layout.citation),
        narrative: present(&narrative.join("\n\n")),
        affirmation: row(layout.affirmation),
    }
}
