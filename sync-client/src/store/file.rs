//! JSON-file stores.
//!
//! Each store owns one file. Writes go to a sibling temp file that is then
//! renamed over the original, so a crash mid-write never leaves a torn file.
//! A missing file reads as the empty/default state.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use deltasync_types::{ChangeListVersions, Entity, SyncError};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use super::{LocalCache, VersionStore, VersionTransform};

/// Read and parse a JSON file, `None` if it does not exist.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SyncError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            SyncError::InvalidData(format!("{}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SyncError::Storage(format!("read {}: {}", path.display(), e))),
    }
}

/// Serialize to a temp file and rename it over `path`.
pub(crate) async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SyncError> {
    let contents = serde_json::to_vec_pretty(value)
        .map_err(|e| SyncError::Internal(format!("serialize {}: {}", path.display(), e)))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| SyncError::Storage(format!("write {}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| SyncError::Storage(format!("rename {}: {}", path.display(), e)))
}

/// Version record persisted as a JSON file.
#[derive(Debug)]
pub struct FileVersionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileVersionStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VersionStore for FileVersionStore {
    async fn get_change_list_versions(&self) -> Result<ChangeListVersions, SyncError> {
        let _guard = self.lock.lock().await;
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    async fn update_change_list_versions(
        &self,
        transform: VersionTransform,
    ) -> Result<(), SyncError> {
        let _guard = self.lock.lock().await;
        let current: ChangeListVersions = read_json(&self.path).await?.unwrap_or_default();
        write_json(&self.path, &transform(current)).await
    }
}

/// Entity cache persisted as a JSON array sorted by id.
#[derive(Debug)]
pub struct JsonFileCache<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> JsonFileCache<T> {
    /// Cache backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _entity: PhantomData,
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, T>, SyncError> {
        let entities: Vec<T> = read_json(&self.path).await?.unwrap_or_default();
        Ok(entities
            .into_iter()
            .map(|entity| (entity.id().to_string(), entity))
            .collect())
    }

    async fn save(&self, entities: &BTreeMap<String, T>) -> Result<(), SyncError> {
        let list: Vec<&T> = entities.values().collect();
        write_json(&self.path, &list).await
    }
}

#[async_trait]
impl<T: Entity> LocalCache<T> for JsonFileCache<T> {
    async fn delete_entities(&self, ids: &[String]) -> Result<(), SyncError> {
        if ids.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        let mut entities = self.load().await?;
        for id in ids {
            entities.remove(id);
        }
        self.save(&entities).await
    }

    async fn upsert_entities(&self, new: Vec<T>) -> Result<(), SyncError> {
        if new.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        let mut entities = self.load().await?;
        for entity in new {
            entities.insert(entity.id().to_string(), entity);
        }
        self.save(&entities).await
    }

    async fn all(&self) -> Result<Vec<T>, SyncError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_values().collect())
    }
}
