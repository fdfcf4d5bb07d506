// In-memory local store with optional snapshot persistence.
// Live queries are driven by per-table revision channels.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{HubError, Result};

use super::local::LocalStore;
use super::records::{RepositoryRecord, UserRecord};
use super::store::{read_stamped, write_stamped};

/// On-disk form of the store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    users: Vec<UserRecord>,
    repositories: Vec<RepositoryRecord>,
    #[serde(default)]
    users_fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<u64, UserRecord>,
    repositories: BTreeMap<u64, RepositoryRecord>,
    users_fetched_at: Option<DateTime<Utc>>,
}

impl Tables {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut tables = Self {
            users_fetched_at: snapshot.users_fetched_at,
            ..Self::default()
        };
        for user in snapshot.users {
            tables.put_user(user);
        }
        for repository in snapshot.repositories {
            tables.repositories.insert(repository.id(), repository);
        }
        tables
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.users.values().cloned().collect(),
            repositories: self.repositories.values().cloned().collect(),
            users_fetched_at: self.users_fetched_at,
        }
    }

    /// Insert or replace by id, evicting any other row that holds the same login.
    fn put_user(&mut self, record: UserRecord) {
        let id = record.id();
        self.users
            .retain(|existing, user| *existing == id || user.login() != record.login());
        self.users.insert(id, record);
    }

    fn users_where(&self, keep: impl Fn(&UserRecord) -> bool) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self
            .users
            .values()
            .filter(|u| keep(*u))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.login().cmp(b.login()));
        users
    }

    fn repositories_of(&self, owner: &str) -> Vec<RepositoryRecord> {
        let mut repos: Vec<RepositoryRecord> = self
            .repositories
            .values()
            .filter(|r| r.owner_login == owner)
            .cloned()
            .collect();
        repos.sort_by(|a, b| {
            b.stars()
                .cmp(&a.stars())
                .then_with(|| a.repository.name.cmp(&b.repository.name))
        });
        repos
    }
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Users,
    Repositories,
}

struct Shared {
    tables: Mutex<Tables>,
    // Serializes writers so snapshots reach the file in commit order
    writer: tokio::sync::Mutex<()>,
    users_rev: watch::Sender<u64>,
    repos_rev: watch::Sender<u64>,
    snapshot_path: Option<PathBuf>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn revisions(&self, table: Table) -> &watch::Sender<u64> {
        match table {
            Table::Users => &self.users_rev,
            Table::Repositories => &self.repos_rev,
        }
    }
}

/// `LocalStore` backed by in-memory tables.
///
/// Cloning is cheap and every clone shares the same tables. When opened with
/// a path, the whole store is rewritten to that file after each write.
#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty, purely in-memory store.
    pub fn new() -> Self {
        Self::build(Tables::default(), None)
    }

    /// Open a store persisted at `path`, loading the previous snapshot if any.
    ///
    /// An unreadable snapshot is discarded with a warning and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = match read_stamped::<Snapshot>(&path) {
            Ok(Some(stamped)) => {
                debug!(
                    path = %path.display(),
                    users = stamped.data.users.len(),
                    repositories = stamped.data.repositories.len(),
                    saved_at = %stamped.saved_at,
                    "Loaded store snapshot"
                );
                Tables::from_snapshot(stamped.data)
            }
            Ok(None) => Tables::default(),
            Err(HubError::Json(e)) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable store snapshot");
                Tables::default()
            }
            Err(e) => return Err(e),
        };
        Ok(Self::build(tables, Some(path)))
    }

    fn build(tables: Tables, snapshot_path: Option<PathBuf>) -> Self {
        let (users_rev, _) = watch::channel(0);
        let (repos_rev, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                tables: Mutex::new(tables),
                writer: tokio::sync::Mutex::new(()),
                users_rev,
                repos_rev,
                snapshot_path,
            }),
        }
    }

    fn read<T>(&self, query: impl FnOnce(&Tables) -> T) -> T {
        query(&*self.shared.lock())
    }

    /// Apply `change` to a copy of the tables, persist it, then publish it.
    ///
    /// Readers keep the table lock only for the copy and the swap; the
    /// snapshot file is written on the blocking pool. A failed persist
    /// leaves the tables untouched.
    async fn write<T, F>(&self, table: Table, change: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut Tables) -> T + Send,
    {
        let _writer = self.shared.writer.lock().await;

        let (next, result) = {
            let mut next = self.shared.lock().clone();
            let result = change(&mut next);
            (next, result)
        };

        if let Some(path) = self.shared.snapshot_path.clone() {
            let snapshot = next.snapshot();
            tokio::task::spawn_blocking(move || write_stamped(&path, &snapshot))
                .await
                .map_err(|e| HubError::Other(format!("snapshot writer failed: {}", e)))??;
        }

        *self.shared.lock() = next;
        self.shared.revisions(table).send_modify(|rev| *rev += 1);
        Ok(result)
    }

    fn live<T, F>(&self, table: Table, query: F) -> BoxStream<'static, T>
    where
        T: Send + 'static,
        F: Fn(&Tables) -> T + Send + 'static,
    {
        let rx = self.shared.revisions(table).subscribe();
        let shared = Arc::clone(&self.shared);
        stream::unfold((rx, shared, query, true), |(mut rx, shared, query, first)| async move {
            if first {
                rx.borrow_and_update();
            } else if rx.changed().await.is_err() {
                return None;
            }
            let current = {
                let tables = shared.lock();
                query(&*tables)
            };
            Some((current, (rx, shared, query, false)))
        })
        .boxed()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    fn watch_users(&self) -> BoxStream<'static, Vec<UserRecord>> {
        self.live(Table::Users, |t| t.users_where(|_| true))
    }

    fn watch_user_search(&self, query: &str) -> BoxStream<'static, Vec<UserRecord>> {
        let query = query.to_string();
        self.live(Table::Users, move |t| {
            t.users_where(|u| u.login().contains(query.as_str()))
        })
    }

    fn watch_repositories(&self, owner: &str) -> BoxStream<'static, Vec<RepositoryRecord>> {
        let owner = owner.to_string();
        self.live(Table::Repositories, move |t| t.repositories_of(&owner))
    }

    async fn users(&self) -> Result<Vec<UserRecord>> {
        Ok(self.read(|t| t.users_where(|_| true)))
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserRecord>> {
        Ok(self.read(|t| t.users_where(|u| u.login().contains(query))))
    }

    async fn user(&self, login: &str) -> Result<Option<UserRecord>> {
        Ok(self.read(|t| t.users.values().find(|u| u.login() == login).cloned()))
    }

    async fn repositories(&self, owner: &str) -> Result<Vec<RepositoryRecord>> {
        Ok(self.read(|t| t.repositories_of(owner)))
    }

    async fn upsert_user(&self, user: UserRecord) -> Result<()> {
        self.write(Table::Users, |t| t.put_user(user)).await
    }

    async fn upsert_users(&self, users: Vec<UserRecord>) -> Result<()> {
        self.write(Table::Users, |t| {
            for user in users {
                t.put_user(user);
            }
        })
        .await
    }

    async fn upsert_user_listing(
        &self,
        users: Vec<UserRecord>,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        self.write(Table::Users, |t| {
            for user in users {
                t.put_user(user);
            }
            t.users_fetched_at = Some(fetched_at);
        })
        .await
    }

    async fn users_fetched_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read(|t| t.users_fetched_at))
    }

    async fn upsert_repository(&self, repository: RepositoryRecord) -> Result<()> {
        self.write(Table::Repositories, |t| {
            t.repositories.insert(repository.id(), repository);
        })
        .await
    }

    async fn upsert_repositories(&self, repositories: Vec<RepositoryRecord>) -> Result<()> {
        self.write(Table::Repositories, |t| {
            for repository in repositories {
                t.repositories.insert(repository.id(), repository);
            }
        })
        .await
    }

    async fn replace_repositories(
        &self,
        owner: &str,
        repositories: Vec<RepositoryRecord>,
    ) -> Result<()> {
        self.write(Table::Repositories, |t| {
            t.repositories.retain(|_, r| r.owner_login != owner);
            for repository in repositories {
                t.repositories.insert(repository.id(), repository);
            }
        })
        .await
    }

    async fn delete_all_users(&self) -> Result<()> {
        self.write(Table::Users, |t| {
            t.users.clear();
            t.users_fetched_at = None;
        })
        .await
    }

    async fn delete_repositories(&self, owner: &str) -> Result<()> {
        self.write(Table::Repositories, |t| {
            t.repositories.retain(|_, r| r.owner_login != owner);
        })
        .await
    }

    async fn delete_users_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.write(Table::Users, |t| {
            let before = t.users.len();
            t.users.retain(|_, u| u.cached_at >= cutoff);
            before - t.users.len()
        })
        .await
    }

    async fn delete_repositories_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.write(Table::Repositories, |t| {
            let before = t.repositories.len();
            t.repositories.retain(|_, r| r.cached_at >= cutoff);
            before - t.repositories.len()
        })
        .await
    }

    async fn user_count(&self) -> Result<usize> {
        Ok(self.read(|t| t.users.len()))
    }

    async fn repository_count(&self, owner: &str) -> Result<usize> {
        Ok(self.read(|t| {
            t.repositories
                .values()
                .filter(|r| r.owner_login == owner)
                .count()
        }))
    }
}
