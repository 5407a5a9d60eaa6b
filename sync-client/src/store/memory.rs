//! In-memory stores.

use std::collections::BTreeMap;

use async_trait::async_trait;
use deltasync_types::{ChangeListVersions, Entity, SyncError};
use tokio::sync::Mutex;

use super::{LocalCache, VersionStore, VersionTransform};

/// Version record held in memory behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryVersionStore {
    versions: Mutex<ChangeListVersions>,
}

impl MemoryVersionStore {
    /// Start with every cursor at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record.
    pub fn with_versions(versions: ChangeListVersions) -> Self {
        Self {
            versions: Mutex::new(versions),
        }
    }
}

#[async_trait]
impl VersionStore for MemoryVersionStore {
    async fn get_change_list_versions(&self) -> Result<ChangeListVersions, SyncError> {
        Ok(*self.versions.lock().await)
    }

    async fn update_change_list_versions(
        &self,
        transform: VersionTransform,
    ) -> Result<(), SyncError> {
        let mut versions = self.versions.lock().await;
        *versions = transform(*versions);
        Ok(())
    }
}

/// Entity cache held in memory, keyed by id.
#[derive(Debug)]
pub struct MemoryCache<T> {
    entities: Mutex<BTreeMap<String, T>>,
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self {
            entities: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T: Entity> MemoryCache<T> {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-filled with `entities`.
    pub fn with_entities(entities: Vec<T>) -> Self {
        let map = entities
            .into_iter()
            .map(|entity| (entity.id().to_string(), entity))
            .collect();
        Self {
            entities: Mutex::new(map),
        }
    }

    /// Look up one entity.
    pub async fn get(&self, id: &str) -> Option<T> {
        self.entities.lock().await.get(id).cloned()
    }

    /// Number of cached entities.
    pub async fn len(&self) -> usize {
        self.entities.lock().await.len()
    }

    /// True when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entities.lock().await.is_empty()
    }
}

#[async_trait]
impl<T: Entity> LocalCache<T> for MemoryCache<T> {
    async fn delete_entities(&self, ids: &[String]) -> Result<(), SyncError> {
        let mut entities = self.entities.lock().await;
        for id in ids {
            entities.remove(id);
        }
        Ok(())
    }

    async fn upsert_entities(&self, new: Vec<T>) -> Result<(), SyncError> {
        let mut entities = self.entities.lock().await;
        for entity in new {
            entities.insert(entity.id().to_string(), entity);
        }
        Ok(())
    }

    async fn all(&self) -> Result<Vec<T>, SyncError> {
        Ok(self.entities.lock().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltasync_types::{Cursor, EntityType, Topic};
    use std::sync::Arc;

    fn topic(id: &str, name: &str) -> Topic {
        Topic {
            id: id.into(),
            name: name.into(),
            short_description: String::new(),
            long_description: String::new(),
            url: String::new(),
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn update_applies_transform() {
        let store = MemoryVersionStore::new();
        store
            .update_change_list_versions(Box::new(|v| v.with(EntityType::Topic, Cursor::new(4))))
            .await
            .unwrap();

        let versions = store.get_change_list_versions().await.unwrap();
        assert_eq!(versions.get(EntityType::Topic), Cursor::new(4));
        assert_eq!(versions.get(EntityType::NewsResource), Cursor::zero());
    }

    #[tokio::test]
    async fn concurrent_updates_to_different_fields_are_not_lost() {
        let store = Arc::new(MemoryVersionStore::new());
        let mut handles = Vec::new();

        for i in 1..=50u64 {
            let store = Arc::clone(&store);
            let entity_type = if i % 2 == 0 {
                EntityType::Topic
            } else {
                EntityType::NewsResource
            };
            handles.push(tokio::spawn(async move {
                store
                    .update_change_list_versions(Box::new(move |v| {
                        let bumped = Cursor::new(v.get(entity_type).value() + 1);
                        v.with(entity_type, bumped)
                    }))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let versions = store.get_change_list_versions().await.unwrap();
        assert_eq!(versions.get(EntityType::Topic), Cursor::new(25));
        assert_eq!(versions.get(EntityType::NewsResource), Cursor::new(25));
    }

    #[tokio::test]
    async fn cache_upsert_replaces_by_id() {
        let cache = MemoryCache::with_entities(vec![topic("t1", "Old")]);
        cache
            .upsert_entities(vec![topic("t1", "New"), topic("t2", "Other")])
            .await
            .unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("t1").await.unwrap().name, "New");
    }

    #[tokio::test]
    async fn cache_delete_ignores_unknown_and_empty() {
        let cache = MemoryCache::with_entities(vec![topic("t1", "A"), topic("t2", "B")]);
        cache.delete_entities(&[]).await.unwrap();
        cache
            .delete_entities(&["t1".to_string(), "missing".to_string()])
            .await
            .unwrap();

        let all = cache.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "t2");
    }
}
