// Cache module for local persistence.
// Holds the local store contract, its in-memory implementation, and snapshot files.

pub mod janitor;
pub mod local;
pub mod memory;
pub mod paths;
pub mod records;
pub mod store;

pub use janitor::{Eviction, evict_older_than, spawn_janitor};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use records::{RepositoryRecord, UserRecord};
pub use store::{Stamped, is_within};
