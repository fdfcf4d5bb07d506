// GitHub API response types.
// Defines structs for deserializing user, search, and repository responses.

use serde::{Deserialize, Serialize};

/// GitHub user as returned by the listing, search, and profile endpoints.
///
/// Listing and search responses only carry the first five fields; the
/// profile endpoint fills in the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub user_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: Option<u32>,
    #[serde(default)]
    pub public_gists: Option<u32>,
    #[serde(default)]
    pub followers: Option<u32>,
    #[serde(default)]
    pub following: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub watchers_count: u32,
    pub size: u64,
    pub default_branch: String,
    pub open_issues_count: u32,
    pub private: bool,
    pub fork: bool,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: Option<String>,
}

/// Response of `GET /search/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchUsersResponse {
    pub total_count: u64,
    pub incomplete_results: bool,
    pub items: Vec<User>,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
