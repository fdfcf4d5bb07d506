// Cache coordinator.
// Serves each query from the local store first and refreshes it through the limiter.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::{LocalStore, RepositoryRecord, UserRecord, is_within};
use crate::config::{
    CACHE_TIMEOUT, DEFAULT_PAGE_SIZE, FIRST_PAGE, MIN_SEARCH_QUERY_LENGTH, REPOSITORY_SORT,
};
use crate::error::{FetchError, Result};
use crate::github::RemoteSource;

use super::classify::Query;
use super::limiter::RateLimiter;
use super::result::{CacheRead, ResultStream, revalidate};

/// Reconciles a remote source with a local store.
///
/// Every query returns a lazy [`ResultStream`] that starts with `Loading`
/// and ends after at most one terminal state. Clones share the store, the
/// remote, and the request quota. The user listing's fetch time lives in
/// the store, so it carries over between processes sharing a snapshot.
pub struct CacheCoordinator<R: ?Sized, S: ?Sized> {
    remote: Arc<R>,
    store: Arc<S>,
    limiter: RateLimiter,
    cache_timeout: Duration,
}

impl<R: ?Sized, S: ?Sized> Clone for CacheCoordinator<R, S> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            store: Arc::clone(&self.store),
            limiter: self.limiter.clone(),
            cache_timeout: self.cache_timeout,
        }
    }
}

impl<R, S> CacheCoordinator<R, S>
where
    R: RemoteSource + ?Sized + 'static,
    S: LocalStore + ?Sized + 'static,
{
    pub fn new(remote: Arc<R>, store: Arc<S>) -> Self {
        Self {
            remote,
            store,
            limiter: RateLimiter::default(),
            cache_timeout: CACHE_TIMEOUT,
        }
    }

    /// Share a quota with other coordinators, or use a non-default one.
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_cache_timeout(mut self, cache_timeout: Duration) -> Self {
        self.cache_timeout = cache_timeout;
        self
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// When the user listing was last written through from the remote.
    ///
    /// Unreadable store state reads as never fetched.
    pub async fn last_users_fetch(&self) -> Option<DateTime<Utc>> {
        self.cached_or_default(self.store.users_fetched_at().await, Query::ListUsers)
    }

    // ===== Queries =====

    /// List users, skipping the network while the cached listing is fresh.
    pub fn get_users(&self) -> ResultStream<Vec<UserRecord>> {
        let reader = self.clone();
        let fetcher = self.clone();
        revalidate(
            Query::ListUsers,
            async move {
                let local =
                    reader.cached_or_default(reader.store.users().await, Query::ListUsers);
                if reader.users_fresh(&local, Utc::now()).await {
                    debug!(count = local.len(), "Serving user listing from cache");
                    CacheRead::Settled(local)
                } else {
                    CacheRead::Revalidate {
                        shown: None,
                        fallback: Some(local),
                    }
                }
            },
            move || async move { fetcher.fetch_users().await.map(Some) },
        )
    }

    /// Search users by login. Cached matches are shown first, then refreshed.
    pub fn search_users(&self, query: &str) -> ResultStream<Vec<UserRecord>> {
        let query = query.trim().to_string();
        let term = query.clone();
        let reader = self.clone();
        let fetcher = self.clone();
        revalidate(
            Query::SearchUsers,
            async move {
                if query.chars().count() < MIN_SEARCH_QUERY_LENGTH {
                    return CacheRead::Settled(Vec::new());
                }
                let local = reader.cached_or_default(
                    reader.store.search_users(&query).await,
                    Query::SearchUsers,
                );
                CacheRead::Revalidate {
                    shown: (!local.is_empty()).then(|| local.clone()),
                    fallback: Some(local),
                }
            },
            move || async move { fetcher.fetch_search(&term).await.map(Some) },
        )
    }

    /// One user's profile: the cached copy first, then the refreshed one.
    pub fn get_user_details(&self, login: &str) -> ResultStream<UserRecord> {
        let login = login.to_string();
        let target = login.clone();
        let reader = self.clone();
        let fetcher = self.clone();
        revalidate(
            Query::UserDetails,
            async move {
                let local =
                    reader.cached_or_default(reader.store.user(&login).await, Query::UserDetails);
                CacheRead::Revalidate {
                    shown: local.clone(),
                    fallback: local,
                }
            },
            move || async move { fetcher.fetch_user_details(&target).await },
        )
    }

    /// A user's repositories: the cached set first, then the replaced set.
    pub fn get_user_repositories(&self, owner: &str) -> ResultStream<Vec<RepositoryRecord>> {
        let owner = owner.to_string();
        let target = owner.clone();
        let reader = self.clone();
        let fetcher = self.clone();
        revalidate(
            Query::UserRepositories,
            async move {
                let local = reader.cached_or_default(
                    reader.store.repositories(&owner).await,
                    Query::UserRepositories,
                );
                CacheRead::Revalidate {
                    shown: (!local.is_empty()).then(|| local.clone()),
                    fallback: Some(local),
                }
            },
            move || async move { fetcher.fetch_repositories(&target).await.map(Some) },
        )
    }

    // ===== Background refresh =====

    /// Refetch the user listing and merge it into the store; failures are logged and dropped.
    pub async fn refresh_users(&self) {
        if let Err(err) = self.fetch_users().await {
            warn!(error = %Query::ListUsers.describe(&err), "Background user refresh failed");
        }
    }

    /// Refetch one profile; failures are logged and dropped.
    pub async fn refresh_user_details(&self, login: &str) {
        if let Err(err) = self.fetch_user_details(login).await {
            warn!(
                login = login,
                error = %Query::UserDetails.describe(&err),
                "Background profile refresh failed"
            );
        }
    }

    /// Refetch and replace an owner's repositories; failures are logged and dropped.
    pub async fn refresh_user_repositories(&self, owner: &str) {
        if let Err(err) = self.fetch_repositories(owner).await {
            warn!(
                owner = owner,
                error = %Query::UserRepositories.describe(&err),
                "Background repository refresh failed"
            );
        }
    }

    // ===== Fetch and write-through =====

    async fn fetch_users(&self) -> std::result::Result<Vec<UserRecord>, FetchError> {
        self.limiter.acquire().await;
        let users = self.remote.fetch_users(FIRST_PAGE, DEFAULT_PAGE_SIZE).await?;

        let now = Utc::now();
        let records: Vec<UserRecord> = users.into_iter().map(|u| UserRecord::new(u, now)).collect();
        self.store.upsert_user_listing(records.clone(), now).await?;

        info!(count = records.len(), "Fetched user listing");
        Ok(records)
    }

    async fn fetch_search(&self, query: &str) -> std::result::Result<Vec<UserRecord>, FetchError> {
        self.limiter.acquire().await;
        let results = self
            .remote
            .search_users(query, FIRST_PAGE, DEFAULT_PAGE_SIZE)
            .await?;
        if results.incomplete_results {
            debug!(query = query, "Search results reported incomplete");
        }

        let now = Utc::now();
        let records: Vec<UserRecord> = results
            .items
            .into_iter()
            .map(|u| UserRecord::new(u, now))
            .collect();
        self.store.upsert_users(records).await?;

        let matches = self.store.search_users(query).await?;
        info!(query = query, total = results.total_count, cached = matches.len(), "Searched users");
        Ok(matches)
    }

    async fn fetch_user_details(
        &self,
        login: &str,
    ) -> std::result::Result<Option<UserRecord>, FetchError> {
        self.limiter.acquire().await;
        let user = self.remote.fetch_user(login).await?;

        self.store.upsert_user(UserRecord::new(user, Utc::now())).await?;
        let updated = self.store.user(login).await?;
        if updated.is_none() {
            debug!(login = login, "Fetched profile is not stored under the requested login");
        }
        Ok(updated)
    }

    async fn fetch_repositories(
        &self,
        owner: &str,
    ) -> std::result::Result<Vec<RepositoryRecord>, FetchError> {
        self.limiter.acquire().await;
        let repositories = self
            .remote
            .fetch_user_repositories(owner, FIRST_PAGE, DEFAULT_PAGE_SIZE, REPOSITORY_SORT)
            .await?;

        let now = Utc::now();
        let records: Vec<RepositoryRecord> = repositories
            .into_iter()
            .map(|r| RepositoryRecord::new(r, owner, now))
            .collect();
        self.store.replace_repositories(owner, records).await?;

        let updated = self.store.repositories(owner).await?;
        info!(owner = owner, count = updated.len(), "Fetched repositories");
        Ok(updated)
    }

    // ===== Helpers =====

    /// Local read failures count as a cache miss.
    fn cached_or_default<T: Default>(&self, read: Result<T>, query: Query) -> T {
        match read {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    query = query.name(),
                    error = %e,
                    "Local read failed, treating as cache miss"
                );
                T::default()
            }
        }
    }

    /// The listing is fresh when non-empty and fetched within the cache timeout.
    ///
    /// Only a listing write-through counts as a fetch; users cached by search
    /// or profile lookups never make the listing fresh.
    async fn users_fresh(&self, local: &[UserRecord], now: DateTime<Utc>) -> bool {
        if local.is_empty() {
            return false;
        }
        self.last_users_fetch()
            .await
            .is_some_and(|fetched_at| is_within(fetched_at, now, self.cache_timeout))
    }
}
