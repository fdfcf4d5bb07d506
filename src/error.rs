// Error types for hubcache.
// Separates infrastructure failures from the fetch taxonomy surfaced by queries.

use thiserror::Error;

/// Infrastructure errors: client construction, local persistence, paths.
#[derive(Error, Debug)]
pub enum HubError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid GitHub token: {0}")]
    InvalidToken(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine a cache directory")]
    NoCacheDir,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HubError>;

/// Failure of a single remote fetch or of the write-through that follows it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No connectivity or transport failure.
    #[error("{0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("HTTP {status} {reason}")]
    Http { status: u16, reason: String },

    /// Anything else: undecodable bodies, store failures.
    #[error("{0}")]
    Unknown(String),
}

impl FetchError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HubError> for FetchError {
    fn from(err: HubError) -> Self {
        FetchError::Unknown(err.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Unknown(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
