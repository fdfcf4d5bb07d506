// Sync module.
// Stale-while-revalidate coordination between the GitHub API and the local store.

pub mod classify;
pub mod coordinator;
pub mod limiter;
pub mod result;

pub use classify::Query;
pub use coordinator::CacheCoordinator;
pub use limiter::RateLimiter;
pub use result::{ResultState, ResultStream};
