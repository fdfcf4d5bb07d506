// Cached record types.
// Wire values stamped with the time they were written to the local store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::{Repository, User};

/// A user as held by the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub user: User,
    pub cached_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(user: User, cached_at: DateTime<Utc>) -> Self {
        Self { user, cached_at }
    }

    /// Primary identifier.
    pub fn id(&self) -> u64 {
        self.user.id
    }

    /// Natural key, unique within the store.
    pub fn login(&self) -> &str {
        &self.user.login
    }
}

/// A repository as held by the local store, tagged with the owner it was listed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    #[serde(flatten)]
    pub repository: Repository,
    pub owner_login: String,
    pub cached_at: DateTime<Utc>,
}

impl RepositoryRecord {
    pub fn new(
        repository: Repository,
        owner_login: impl Into<String>,
        cached_at: DateTime<Utc>,
    ) -> Self {
        Self {
            repository,
            owner_login: owner_login.into(),
            cached_at,
        }
    }

    pub fn id(&self) -> u64 {
        self.repository.id
    }

    pub fn stars(&self) -> u32 {
        self.repository.stargazers_count
    }
}
