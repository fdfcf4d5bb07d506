// Remote source abstraction.
// The coordinator talks to the directory API only through this trait.

use async_trait::async_trait;

use crate::error::FetchError;

use super::types::{Repository, SearchUsersResponse, User};

/// Remote directory-and-search API.
///
/// Implementations supply their own transport timeouts; callers never
/// retry on their own.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// List users with an id greater than `since`.
    async fn fetch_users(&self, since: u32, per_page: u32) -> Result<Vec<User>, FetchError>;

    /// Search users by login.
    async fn search_users(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchUsersResponse, FetchError>;

    /// Fetch one user's full profile.
    async fn fetch_user(&self, login: &str) -> Result<User, FetchError>;

    /// List a user's public repositories.
    async fn fetch_user_repositories(
        &self,
        login: &str,
        page: u32,
        per_page: u32,
        sort: &str,
    ) -> Result<Vec<Repository>, FetchError>;
}
