//! Markdown rendering of the readings bundle.
//!
//! Every source gets a section, in bundle order. A source without a reading
//! gets a placeholder line, so the page is complete even when all three fail.

use crate::models::{Reading, ReadingsBundle, Source};
use crate::utils::date_label;
use itertools::Itertools;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Shown in place of a missing reading.
pub const PLACEHOLDER: &str = "_No reading is available for today. Please check back later._";

/// Render the whole bundle.
pub fn bundle_to_markdown(bundle: &ReadingsBundle) -> String {
    let sections = Source::ALL
        .iter()
        .map(|source| {
            let body = match bundle.get(*source) {
                Some(reading) => reading_to_markdown(reading),
                None => PLACEHOLDER.to_string(),
            };
            format!("## {}\n\n{}", source.title(), body)
        })
        .join("\n\n");

    format!(
        "# Daily Readings for {}\n\n{}\n",
        date_label(bundle.date),
        sections
    )
}

/// Render one reading; absent fields are simply left out.
pub fn reading_to_markdown(reading: &Reading) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(date) = &reading.date {
        parts.push(format!("_{date}_"));
    }
    if let Some(heading) = &reading.heading {
        parts.push(format!("### {heading}"));
    }
    if let Some(quote) = &reading.quote {
        parts.push(quote.lines().map(|l| format!("> {l}")).join("\n"));
    }
    if let Some(citation) = &reading.source_citation {
        parts.push(format!("— {citation}"));
    }
    if let Some(narrative) = &reading.narrative {
        parts.push(narrative.clone());
    }
    if let Some(affirmation) = &reading.affirmation {
        parts.push(format!("**{affirmation}**"));
    }

    parts.join("\n\n")
}

/// Write the rendered bundle to `{markdown_output_dir}/{date}.md`.
#[instrument(level = "info", skip_all, fields(markdown_output_dir = %markdown_output_dir.display()))]
pub async fn write_markdown(
    bundle: &ReadingsBundle,
    markdown_output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let path = markdown_output_dir.join(format!("{}.md", bundle.date));
    fs::write(&path, bundle_to_markdown(bundle)).await?;
    info!(path = %path.display(), "Wrote Markdown bundle");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bundle(jft: Option<Reading>) -> ReadingsBundle {
        ReadingsBundle {
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            daily_reflection: None,
            just_for_today: jft,
            spiritual_principle: None,
        }
    }

    #[test]
    fn test_all_absent_renders_three_placeholders() {
        let md = bundle_to_markdown(&bundle(None));
        assert!(md.starts_with("# Daily Readings for October 18"));
        assert_eq!(md.matches(PLACEHOLDER).count(), 3);
        assert!(md.contains("## Daily Reflection"));
        assert!(md.contains("## Just For Today"));
        assert!(md.contains("## Spiritual Principle A Day"));
    }

    #[test]
    fn test_partial_reading_skips_absent_fields() {
        let reading = Reading {
            heading: Some("Sharing the load".to_string()),
            quote: Some("Line one\nLine two".to_string()),
            affirmation: Some("Just for Today: I will share.".to_string()),
            ..Reading::default()
        };
        let md = reading_to_markdown(&reading);
        assert_eq!(
            md,
            "### Sharing the load\n\n> Line one\n> Line two\n\n**Just for Today: I will share.**"
        );

        let page = bundle_to_markdown(&bundle(Some(reading)));
        assert_eq!(page.matches(PLACEHOLDER).count(), 2);
    }

    #[tokio::test]
    async fn test_write_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_markdown(&bundle(None), dir.path()).await.unwrap();
        assert!(path.ends_with("2026-10-18.md"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains(PLACEHOLDER));
    }
}
