// Local store abstraction.
// Keyed persistent cache for users and repositories, with live queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::error::Result;

use super::records::{RepositoryRecord, UserRecord};

/// Keyed persistent cache of users and repositories.
///
/// Users are ordered by login ascending and repositories by stars
/// descending wherever a list is returned. Each write call is applied
/// atomically: readers observe all of it or none of it. Upserts are keyed
/// by primary id and displace any other user holding the same login.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Live view of all users; yields now and again after every user write.
    fn watch_users(&self) -> BoxStream<'static, Vec<UserRecord>>;

    /// Live view of users whose login contains `query` (case-sensitive).
    fn watch_user_search(&self, query: &str) -> BoxStream<'static, Vec<UserRecord>>;

    /// Live view of an owner's repositories.
    fn watch_repositories(&self, owner: &str) -> BoxStream<'static, Vec<RepositoryRecord>>;

    async fn users(&self) -> Result<Vec<UserRecord>>;

    async fn search_users(&self, query: &str) -> Result<Vec<UserRecord>>;

    async fn user(&self, login: &str) -> Result<Option<UserRecord>>;

    async fn repositories(&self, owner: &str) -> Result<Vec<RepositoryRecord>>;

    async fn upsert_user(&self, user: UserRecord) -> Result<()>;

    async fn upsert_users(&self, users: Vec<UserRecord>) -> Result<()>;

    /// Upsert a fetched user listing and stamp the listing's fetch time, as one write.
    async fn upsert_user_listing(
        &self,
        users: Vec<UserRecord>,
        fetched_at: DateTime<Utc>,
    ) -> Result<()>;

    /// When the full user listing was last written, if ever.
    ///
    /// Only listing writes move this; search and profile upserts leave it alone.
    async fn users_fetched_at(&self) -> Result<Option<DateTime<Utc>>>;

    async fn upsert_repository(&self, repository: RepositoryRecord) -> Result<()>;

    async fn upsert_repositories(&self, repositories: Vec<RepositoryRecord>) -> Result<()>;

    /// Delete every repository owned by `owner`, then insert `repositories`, as one write.
    async fn replace_repositories(
        &self,
        owner: &str,
        repositories: Vec<RepositoryRecord>,
    ) -> Result<()>;

    /// Delete every user and forget the listing's fetch time.
    async fn delete_all_users(&self) -> Result<()>;

    async fn delete_repositories(&self, owner: &str) -> Result<()>;

    /// Delete users cached before `cutoff`; returns how many were removed.
    async fn delete_users_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    /// Delete repositories cached before `cutoff`; returns how many were removed.
    async fn delete_repositories_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    async fn user_count(&self) -> Result<usize>;

    async fn repository_count(&self, owner: &str) -> Result<usize>;
}
