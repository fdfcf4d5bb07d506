// Test fixtures.
// Builders for wire types and a scripted remote source.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::FetchError;
use crate::github::{RemoteSource, Repository, SearchUsersResponse, User};

pub(crate) fn user(id: u64, login: &str) -> User {
    User {
        id,
        login: login.to_string(),
        avatar_url: format!("https://avatars.githubusercontent.com/u/{}?v=4", id),
        html_url: format!("https://github.com/{}", login),
        user_type: "User".to_string(),
        name: None,
        company: None,
        blog: None,
        location: None,
        email: None,
        bio: None,
        public_repos: None,
        public_gists: None,
        followers: None,
        following: None,
        created_at: None,
    }
}

pub(crate) fn repo(id: u64, name: &str, stars: u32) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        full_name: format!("octocat/{}", name),
        description: None,
        html_url: format!("https://github.com/octocat/{}", name),
        language: Some("Rust".to_string()),
        stargazers_count: stars,
        forks_count: 0,
        watchers_count: stars,
        size: 128,
        default_branch: "main".to_string(),
        open_issues_count: 0,
        private: false,
        fork: false,
        created_at: "2011-01-26T19:01:12Z".to_string(),
        updated_at: "2024-01-26T19:14:43Z".to_string(),
        pushed_at: None,
    }
}

pub(crate) fn network_error() -> FetchError {
    FetchError::Network("connection reset by peer".to_string())
}

pub(crate) fn http_error(status: u16) -> FetchError {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    FetchError::Http {
        status,
        reason: reason.to_string(),
    }
}

type Scripted<T> = Mutex<Option<Result<T, FetchError>>>;

/// Remote source answering from canned results and recording every call.
///
/// An endpoint without a scripted answer fails with `FetchError::Unknown`.
#[derive(Default)]
pub(crate) struct FakeRemote {
    users: Scripted<Vec<User>>,
    search: Scripted<Vec<User>>,
    profile: Scripted<User>,
    repositories: Scripted<Vec<Repository>>,
    calls: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_users(self, answer: Result<Vec<User>, FetchError>) -> Self {
        *self.users.lock().unwrap() = Some(answer);
        self
    }

    pub(crate) fn with_search(self, answer: Result<Vec<User>, FetchError>) -> Self {
        *self.search.lock().unwrap() = Some(answer);
        self
    }

    pub(crate) fn with_profile(self, answer: Result<User, FetchError>) -> Self {
        *self.profile.lock().unwrap() = Some(answer);
        self
    }

    pub(crate) fn with_repositories(self, answer: Result<Vec<Repository>, FetchError>) -> Self {
        *self.repositories.lock().unwrap() = Some(answer);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer<T: Clone>(&self, slot: &Scripted<T>, call: String) -> Result<T, FetchError> {
        self.calls.lock().unwrap().push(call.clone());
        slot.lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(FetchError::Unknown(format!("unscripted call: {}", call))))
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn fetch_users(&self, since: u32, per_page: u32) -> Result<Vec<User>, FetchError> {
        self.answer(
            &self.users,
            format!("fetch_users since={} per_page={}", since, per_page),
        )
    }

    async fn search_users(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchUsersResponse, FetchError> {
        let items = self.answer(
            &self.search,
            format!("search_users q={} page={} per_page={}", query, page, per_page),
        )?;
        Ok(SearchUsersResponse {
            total_count: items.len() as u64,
            incomplete_results: false,
            items,
        })
    }

    async fn fetch_user(&self, login: &str) -> Result<User, FetchError> {
        self.answer(&self.profile, format!("fetch_user {}", login))
    }

    async fn fetch_user_repositories(
        &self,
        login: &str,
        page: u32,
        per_page: u32,
        sort: &str,
    ) -> Result<Vec<Repository>, FetchError> {
        self.answer(
            &self.repositories,
            format!(
                "fetch_user_repositories {} page={} per_page={} sort={}",
                login, page, per_page, sort
            ),
        )
    }
}
