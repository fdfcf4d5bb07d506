// GitHub API HTTP client.
// Handles headers, optional authentication, rate limit tracking, and status mapping.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::{FetchError, HubError, Result};

use super::types::RateLimit;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Requests that take longer than this fail as network errors.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub API client with optional authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a new GitHub client, authenticated when a token is given.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| HubError::InvalidToken(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("hubcache"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: GITHUB_API_BASE.to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Create a client from environment settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.token.as_deref())
    }

    /// Point the client at another API root (GitHub Enterprise, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the most recent rate limit information reported by the server.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Build an API URL from path segments, percent-encoding each one.
    ///
    /// A login such as `octocat/repos` stays a single segment.
    pub fn endpoint_url(&self, segments: &[&str]) -> std::result::Result<Url, FetchError> {
        let invalid = |reason: String| {
            FetchError::Unknown(format!("invalid base URL {}: {}", self.base_url, reason))
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        segments: &[&str],
        params: &T,
    ) -> std::result::Result<Response, FetchError> {
        let url = self.endpoint_url(segments)?;
        debug!(url = %url, "GET");
        let response = self.client.get(url).query(params).send().await?;

        self.update_rate_limit(&response);
        check_response(response).await
    }

    /// Make a GET request without query parameters.
    pub async fn get(&self, segments: &[&str]) -> std::result::Result<Response, FetchError> {
        self.get_with_params(segments, &[] as &[(&str, &str)]).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        };

        let mut rate_limit = self
            .rate_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }
}

/// Pass successful responses through and turn everything else into `FetchError::Http`.
async fn check_response(response: Response) -> std::result::Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    warn!(url = %url, status = status.as_u16(), body = %body, "GitHub request failed");
    Err(status_error(status))
}

/// Map a non-success status onto the fetch taxonomy.
fn status_error(status: StatusCode) -> FetchError {
    FetchError::Http {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_code_and_reason() {
        assert_eq!(
            status_error(StatusCode::FORBIDDEN),
            FetchError::Http {
                status: 403,
                reason: "Forbidden".to_string()
            }
        );
        assert_eq!(status_error(StatusCode::UNPROCESSABLE_ENTITY).status(), Some(422));
        assert_eq!(
            status_error(StatusCode::NOT_FOUND).to_string(),
            "HTTP 404 Not Found"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GitHubClient::new(None)
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_endpoint_url_encodes_each_segment() {
        let client = GitHubClient::new(None).unwrap();
        assert_eq!(
            client.endpoint_url(&["users", "octocat", "repos"]).unwrap().as_str(),
            "https://api.github.com/users/octocat/repos"
        );
        assert_eq!(
            client.endpoint_url(&["users", "octocat/repos"]).unwrap().as_str(),
            "https://api.github.com/users/octocat%2Frepos"
        );
        assert_eq!(
            client.endpoint_url(&["users", "a b?c"]).unwrap().as_str(),
            "https://api.github.com/users/a%20b%3Fc"
        );
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let client = GitHubClient::new(None)
            .unwrap()
            .with_base_url("https://ghe.example.com/api/v3/");
        assert_eq!(
            client.endpoint_url(&["search", "users"]).unwrap().as_str(),
            "https://ghe.example.com/api/v3/search/users"
        );
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = GitHubClient::new(Some("bad\ntoken"));
        assert!(matches!(result, Err(HubError::InvalidToken(_))));
    }

    #[test]
    fn test_rate_limit_starts_empty() {
        let client = GitHubClient::new(Some("token")).unwrap();
        assert_eq!(client.rate_limit(), RateLimit::default());
    }
}
