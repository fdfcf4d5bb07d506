// Cache path utilities.
// Resolves where the persisted store snapshot lives on disk.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::config::Settings;
use crate::error::{HubError, Result};

/// File name of the persisted store snapshot.
const STORE_FILE: &str = "store.json";

/// Get the platform cache directory (~/.cache/hubcache on Linux).
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hubcache").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Cache directory honoring the `HUBCACHE_CACHE_DIR` override.
pub fn cache_dir(settings: &Settings) -> Result<PathBuf> {
    settings
        .cache_dir
        .clone()
        .or_else(default_cache_dir)
        .ok_or(HubError::NoCacheDir)
}

/// Path to the store snapshot inside a cache directory.
pub fn store_path_in(dir: impl Into<PathBuf>) -> PathBuf {
    dir.into().join(STORE_FILE)
}

/// Path to the store snapshot for the given settings.
pub fn store_path(settings: &Settings) -> Result<PathBuf> {
    cache_dir(settings).map(store_path_in)
}
