// hubcache library.
// Cache-first access to the GitHub user directory with a shared request quota.

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod sync;

#[cfg(test)]
mod testing;

pub use cache::{LocalStore, MemoryStore, RepositoryRecord, UserRecord};
pub use config::Settings;
pub use error::{FetchError, HubError, Result};
pub use github::{GitHubClient, RemoteSource};
pub use sync::{CacheCoordinator, RateLimiter, ResultState, ResultStream};
