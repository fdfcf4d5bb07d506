// GitHub API endpoint functions.
// Implements the remote source over the users, search, and repos endpoints.

use async_trait::async_trait;

use crate::error::FetchError;

use super::client::GitHubClient;
use super::source::RemoteSource;
use super::types::{Repository, SearchUsersResponse, User};

#[async_trait]
impl RemoteSource for GitHubClient {
    async fn fetch_users(&self, since: u32, per_page: u32) -> Result<Vec<User>, FetchError> {
        let params = [
            ("since", since.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let response = self.get_with_params(&["users"], &params).await?;
        let users: Vec<User> = response.json().await?;
        Ok(users)
    }

    async fn search_users(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchUsersResponse, FetchError> {
        let params = [
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let response = self.get_with_params(&["search", "users"], &params).await?;
        let results: SearchUsersResponse = response.json().await?;
        Ok(results)
    }

    async fn fetch_user(&self, login: &str) -> Result<User, FetchError> {
        let response = self.get(&["users", login]).await?;
        let user: User = response.json().await?;
        Ok(user)
    }

    async fn fetch_user_repositories(
        &self,
        login: &str,
        page: u32,
        per_page: u32,
        sort: &str,
    ) -> Result<Vec<Repository>, FetchError> {
        let params = [
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("sort", sort.to_string()),
        ];
        let response = self
            .get_with_params(&["users", login, "repos"], &params)
            .await?;
        let repos: Vec<Repository> = response.json().await?;
        Ok(repos)
    }
}
