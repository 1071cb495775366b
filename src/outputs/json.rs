//! JSON output of the readings bundle.
//!
//! One file per day, `{json_output_dir}/{YYYY-MM-DD}.json`. Re-running on the
//! same day overwrites the file with the latest bundle.

use crate::models::ReadingsBundle;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`ReadingsBundle`] to `{json_output_dir}/{date}.json`.
///
/// # Returns
///
/// The path written, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_bundle(
    bundle: &ReadingsBundle,
    json_output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(bundle)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = json_output_dir.join(format!("{}.json", bundle.date));
    fs::write(&path, json).await?;
    info!(path = %path.display(), available = bundle.available(), "Wrote JSON bundle");
    Ok(path)
}
