// Failure classification.
// Turns fetch errors into the user-facing message each query reports.

use crate::error::FetchError;

const NETWORK_HINT: &str = "Check your internet connection";

/// The logical queries the coordinator serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    ListUsers,
    SearchUsers,
    UserDetails,
    UserRepositories,
}

impl Query {
    pub fn name(self) -> &'static str {
        match self {
            Query::ListUsers => "list_users",
            Query::SearchUsers => "search_users",
            Query::UserDetails => "user_details",
            Query::UserRepositories => "user_repositories",
        }
    }

    /// Human-readable message for a failure of this query.
    pub fn describe(self, err: &FetchError) -> String {
        match (self, err) {
            (Query::SearchUsers, FetchError::Http { status: 403, .. }) => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            (Query::SearchUsers, FetchError::Http { status: 422, .. }) => {
                "Search query validation failed.".to_string()
            }
            (Query::UserDetails, FetchError::Http { status: 404, .. }) => {
                "User not found".to_string()
            }
            (Query::UserRepositories, FetchError::Http { status: 404, .. }) => {
                "User repositories not found".to_string()
            }
            (_, FetchError::Http { .. }) => format!("HTTP Error: {}", err),
            // The listing reports the transport detail; the others a fixed hint
            (Query::ListUsers, FetchError::Network(detail)) if !detail.is_empty() => {
                format!("Network Error: {}", detail)
            }
            (_, FetchError::Network(_)) => format!("Network Error: {}", NETWORK_HINT),
            (_, FetchError::Unknown(detail)) if detail.is_empty() => {
                "Error: Unknown error occurred".to_string()
            }
            (_, FetchError::Unknown(detail)) => format!("Error: {}", detail),
        }
    }
}
