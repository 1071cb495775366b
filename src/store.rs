//! On-disk snapshot of the last good reading per source.
//!
//! This is the fallback of last resort, not an archive: each source has
//! exactly one file, `<dir>/<key>.json`, overwritten on every successful
//! fetch. Writes go to a temporary file in the same directory that is then
//! renamed over the target, so a reader sees either the old or the new
//! snapshot and never a partial one.
//!
//! # Layout
//!
//! ```text
//! snapshot_dir/
//! ├── dr.json
//! ├── jft.json
//! └── spad.json
//! ```

use crate::error::StoreError;
use crate::models::{PersistedSnapshot, Reading, Source};
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, source: Source) -> PathBuf {
        self.dir.join(format!("{}.json", source.key()))
    }

    /// Last saved snapshot for `source`, or `None` if there never was one.
    #[instrument(level = "debug", skip(self))]
    pub async fn load(&self, source: Source) -> Result<Option<PersistedSnapshot>, StoreError> {
        let path = self.path_for(source);
        let bytes = match fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: PersistedSnapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }

    /// Replace the snapshot for `source` with `reading`, captured for `date`.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyReading`] for a reading without fields; I/O and
    /// serialization failures otherwise. A failed save leaves the previous
    /// snapshot in place.
    #[instrument(level = "info", skip(self, reading))]
    pub async fn save(
        &self,
        source: Source,
        reading: &Reading,
        date: NaiveDate,
    ) -> Result<(), StoreError> {
        if reading.is_empty() {
            return Err(StoreError::EmptyReading(source));
        }
        let snapshot = PersistedSnapshot {
            source,
            captured_on: date,
            reading: reading.clone(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;

        let _guard = self.write_lock.lock().await;
        fs::create_dir_all(&self.dir).await?;
        let target = self.path_for(source);
        let tmp = self.dir.join(format!(".{}.json.tmp", source.key()));
        fs::write(&tmp, &json).await?;
        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        info!(path = %target.display(), bytes = json.len(), "Saved snapshot");
        Ok(())
    }
}
