// Configuration constants and environment settings.
// Paging, freshness, and quota values are fixed; only the token and cache location vary.

use std::path::PathBuf;
use std::time::Duration;

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Index of the first page (also the `since` cursor for the user listing).
pub const FIRST_PAGE: u32 = 1;

/// Shortest search query that reaches the store or the network.
pub const MIN_SEARCH_QUERY_LENGTH: usize = 1;

/// Debounce a front end should apply to search input before querying.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// The cached user listing is trusted for this long after a fetch.
pub const CACHE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Outbound requests allowed per rate-limit window.
pub const MAX_REQUESTS_PER_WINDOW: u32 = 60;

/// Length of one rate-limit window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Sort order requested for repository listings.
pub const REPOSITORY_SORT: &str = "updated";

/// Environment variable holding an optional GitHub token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "HUBCACHE_CACHE_DIR";

/// Runtime settings read from the environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Bearer token; unauthenticated requests are allowed.
    pub token: Option<String>,
    /// Explicit cache directory; the platform default is used when unset.
    pub cache_dir: Option<PathBuf>,
}

impl Settings {
    /// Read settings from `GITHUB_TOKEN` and `HUBCACHE_CACHE_DIR`.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            token: non_empty(TOKEN_ENV),
            cache_dir: non_empty(CACHE_DIR_ENV).map(PathBuf::from),
        }
    }
}
