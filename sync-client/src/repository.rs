//! Syncable repositories.
//!
//! A repository owns one entity type's local cache and knows how to bring it
//! up to date with the remote. The [`Synchronizer`] hands every repository the
//! shared version store, so each one only reads and writes its own cursor.

use std::sync::Arc;

use async_trait::async_trait;
use deltasync_types::{ChangeListVersions, Entity, EntityType, SyncError};
use tracing::{info_span, Instrument};

use crate::remote::RemoteDataSource;
use crate::store::{LocalCache, VersionStore, VersionTransform};
use crate::sync::{change_list_sync, Cancelled};

/// Ids fetched per remote call when refreshing updated entities.
pub const DEFAULT_BATCH_SIZE: usize = 40;

/// Something that can sync itself with the remote.
#[async_trait]
pub trait Syncable: Send + Sync {
    /// The entity type this syncable owns.
    fn entity_type(&self) -> EntityType;

    /// Bring the local cache up to date.
    ///
    /// `Ok(false)` on a recoverable failure, `Err(Cancelled)` when the
    /// enclosing scope was cancelled.
    async fn sync_with(&self, synchronizer: &Synchronizer) -> Result<bool, Cancelled>;
}

/// Shared access to the version store for every syncable.
#[derive(Clone)]
pub struct Synchronizer {
    versions: Arc<dyn VersionStore>,
}

impl Synchronizer {
    /// Synchronizer over `versions`.
    pub fn new(versions: Arc<dyn VersionStore>) -> Self {
        Self { versions }
    }

    /// The underlying version store.
    pub fn version_store(&self) -> &dyn VersionStore {
        self.versions.as_ref()
    }

    /// Read the current version record.
    pub async fn get_change_list_versions(&self) -> Result<ChangeListVersions, SyncError> {
        self.versions.get_change_list_versions().await
    }

    /// Apply `transform` to the version record atomically.
    pub async fn update_change_list_versions(
        &self,
        transform: VersionTransform,
    ) -> Result<(), SyncError> {
        self.versions.update_change_list_versions(transform).await
    }

    /// Sync one syncable against this synchronizer.
    pub async fn sync(&self, syncable: &dyn Syncable) -> Result<bool, Cancelled> {
        syncable.sync_with(self).await
    }
}

/// Local cache of one entity type, kept in step with the remote through its
/// change list.
pub struct OfflineFirstRepository<T: Entity> {
    remote: Arc<dyn RemoteDataSource<T>>,
    cache: Arc<dyn LocalCache<T>>,
    batch_size: usize,
}

impl<T: Entity> OfflineFirstRepository<T> {
    /// Repository syncing `cache` from `remote`.
    pub fn new(remote: Arc<dyn RemoteDataSource<T>>, cache: Arc<dyn LocalCache<T>>) -> Self {
        Self {
            remote,
            cache,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Fetch updated entities `batch_size` ids at a time. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Ids fetched per remote call.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[async_trait]
impl<T: Entity> Syncable for OfflineFirstRepository<T> {
    fn entity_type(&self) -> EntityType {
        T::ENTITY_TYPE
    }

    async fn sync_with(&self, synchronizer: &Synchronizer) -> Result<bool, Cancelled> {
        let entity_type = T::ENTITY_TYPE;
        let batch_size = self.batch_size;
        let fetch_remote = Arc::clone(&self.remote);
        let body_remote = Arc::clone(&self.remote);
        let delete_cache = Arc::clone(&self.cache);
        let upsert_cache = Arc::clone(&self.cache);

        change_list_sync(
            synchronizer.version_store(),
            move |versions| versions.get(entity_type),
            move |after| async move { fetch_remote.change_list(after).await },
            move |versions, latest| versions.with(entity_type, latest),
            move |ids: Vec<String>| async move {
                if ids.is_empty() {
                    return Ok(());
                }
                delete_cache.delete_entities(&ids).await
            },
            move |ids: Vec<String>| async move {
                for chunk in ids.chunks(batch_size) {
                    let entities = body_remote.entities(chunk).await?;
                    upsert_cache.upsert_entities(entities).await?;
                }
                Ok(())
            },
        )
        .instrument(info_span!("change_list_sync", entity_type = %entity_type))
        .await
    }
}
