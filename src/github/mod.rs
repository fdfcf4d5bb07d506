// GitHub API module.
// Provides the remote source trait, its HTTP client, and wire types.

pub mod client;
pub mod endpoints;
pub mod source;
pub mod types;

pub use client::GitHubClient;
pub use source::RemoteSource;
pub use types::*;
