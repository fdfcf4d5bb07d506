// Snapshot file store.
// Versioned JSON envelopes written atomically, plus the age arithmetic the cache runs on.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::error::Result;

/// Layout version of snapshot files. Files written with another version are ignored.
pub const FORMAT_VERSION: u32 = 1;

/// Data stamped with the time it was saved and the layout it was saved with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stamped<T> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub data: T,
}

impl<T> Stamped<T> {
    /// Stamp `data` with the current time and format version.
    pub fn new(data: T) -> Self {
        Self {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            data,
        }
    }
}

/// Elapsed time from `since` to `now`; timestamps in the future count as zero.
pub fn age(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    now.signed_duration_since(since)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// True when `since` is no more than `ttl` before `now`.
pub fn is_within(since: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    age(since, now) <= ttl
}

/// Load a snapshot file. Missing files and files of another format version yield `None`.
pub fn read_stamped<T: DeserializeOwned>(path: &Path) -> Result<Option<Stamped<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path)?;
    let stamped: Stamped<T> = serde_json::from_slice(&bytes)?;
    if stamped.version != FORMAT_VERSION {
        warn!(
            path = %path.display(),
            found = stamped.version,
            expected = FORMAT_VERSION,
            "Ignoring snapshot with unknown format version"
        );
        return Ok(None);
    }
    Ok(Some(stamped))
}

/// Stamp `data` and replace the file at `path` with it.
///
/// The bytes go to a sibling temp file first, so readers see either the old
/// snapshot or the new one.
pub fn write_stamped<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec(&Stamped::new(data))?;
    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Remove a snapshot file if present.
pub fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => Ok(other?),
    }
}
