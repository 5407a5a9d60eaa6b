//! Local persistence seams for deltasync.
//!
//! Two collaborators live here:
//! - [`VersionStore`] holds the [`ChangeListVersions`] record and applies
//!   cursor updates as atomic read-modify-write transformations.
//! - [`LocalCache`] holds the synchronized entities of one type.
//!
//! Implementations: in-memory (tests and embedding), JSON files (the CLI),
//! and mocks that record calls and inject failures.

mod file;
mod memory;
mod mock;

pub use file::{FileVersionStore, JsonFileCache};
pub(crate) use file::{read_json, write_json};
pub use memory::{MemoryCache, MemoryVersionStore};
pub use mock::{CacheCall, MockCache};

use async_trait::async_trait;
use deltasync_types::{ChangeListVersions, Entity, SyncError};

/// A pure `old -> new` rewrite of the version record.
pub type VersionTransform = Box<dyn FnOnce(ChangeListVersions) -> ChangeListVersions + Send>;

/// Persistent home of the per-entity-type cursors.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Read the current record.
    async fn get_change_list_versions(&self) -> Result<ChangeListVersions, SyncError>;

    /// Replace the record with `transform(current)`.
    ///
    /// Must be atomic: concurrent updates touching different entity types
    /// may not lose each other's writes.
    async fn update_change_list_versions(&self, transform: VersionTransform)
        -> Result<(), SyncError>;
}

/// Local cache of one entity type.
#[async_trait]
pub trait LocalCache<T: Entity>: Send + Sync {
    /// Delete entities by id. Unknown ids and empty input are fine.
    async fn delete_entities(&self, ids: &[String]) -> Result<(), SyncError>;

    /// Insert or replace entities by id. Empty input is fine.
    async fn upsert_entities(&self, entities: Vec<T>) -> Result<(), SyncError>;

    /// Every cached entity, ordered by id.
    async fn all(&self) -> Result<Vec<T>, SyncError>;
}
