// Cache janitor.
// Periodically evicts users and repositories cached longer ago than a maximum age.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::Result;

use super::local::LocalStore;

/// Rows removed by one eviction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eviction {
    pub users: usize,
    pub repositories: usize,
}

/// Delete every record whose `cached_at` is older than `max_age`.
pub async fn evict_older_than<S>(store: &S, max_age: Duration) -> Result<Eviction>
where
    S: LocalStore + ?Sized,
{
    let cutoff = chrono::Duration::from_std(max_age)
        .ok()
        .and_then(|age| Utc::now().checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let eviction = Eviction {
        users: store.delete_users_older_than(cutoff).await?,
        repositories: store.delete_repositories_older_than(cutoff).await?,
    };
    if eviction.users > 0 || eviction.repositories > 0 {
        info!(
            users = eviction.users,
            repositories = eviction.repositories,
            cutoff = %cutoff,
            "Evicted old cache records"
        );
    }
    Ok(eviction)
}

/// Shortest period between janitor passes.
const MIN_JANITOR_PERIOD: Duration = Duration::from_secs(1);

/// Run `evict_older_than` every `period` until the returned handle is aborted.
///
/// The first pass runs immediately. Failed passes are logged and retried on
/// the next tick. Periods below one second are raised to one second.
pub fn spawn_janitor<S>(store: Arc<S>, max_age: Duration, period: Duration) -> JoinHandle<()>
where
    S: LocalStore + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period.max(MIN_JANITOR_PERIOD));
        loop {
            ticker.tick().await;
            if let Err(e) = evict_older_than(store.as_ref(), max_age).await {
                warn!(error = %e, "Cache eviction failed");
            }
        }
    })
}
