//! Mock local cache for testing.
//!
//! Records every call and can be told to fail the next delete or upsert.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deltasync_types::{Entity, SyncError};

use super::LocalCache;

/// One call made against a [`MockCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCall {
    /// `delete_entities` with these ids.
    Delete(Vec<String>),
    /// `upsert_entities` with entities carrying these ids.
    Upsert(Vec<String>),
}

/// Mock local cache for testing.
///
/// Clones share state, so a test can keep one handle while the repository
/// owns another.
pub struct MockCache<T> {
    inner: Arc<Mutex<MockCacheInner<T>>>,
}

struct MockCacheInner<T> {
    entities: BTreeMap<String, T>,
    calls: Vec<CacheCall>,
    fail_next_delete: Option<SyncError>,
    fail_next_upsert: Option<SyncError>,
}

impl<T> Default for MockCache<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockCacheInner {
                entities: BTreeMap::new(),
                calls: Vec::new(),
                fail_next_delete: None,
                fail_next_upsert: None,
            })),
        }
    }
}

impl<T> Clone for MockCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> MockCache<T> {
    /// Create an empty mock cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<CacheCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Ids currently cached, ordered.
    pub fn ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().entities.keys().cloned().collect()
    }

    /// Cause the next `delete_entities` to fail with `error`.
    pub fn fail_next_delete(&self, error: SyncError) {
        self.inner.lock().unwrap().fail_next_delete = Some(error);
    }

    /// Cause the next `upsert_entities` to fail with `error`.
    pub fn fail_next_upsert(&self, error: SyncError) {
        self.inner.lock().unwrap().fail_next_upsert = Some(error);
    }
}

#[async_trait]
impl<T: Entity> LocalCache<T> for MockCache<T> {
    async fn delete_entities(&self, ids: &[String]) -> Result<(), SyncError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(CacheCall::Delete(ids.to_vec()));

        if let Some(error) = inner.fail_next_delete.take() {
            return Err(error);
        }

        for id in ids {
            inner.entities.remove(id);
        }
        Ok(())
    }

    async fn upsert_entities(&self, entities: Vec<T>) -> Result<(), SyncError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(CacheCall::Upsert(
            entities.iter().map(|e| e.id().to_string()).collect(),
        ));

        if let Some(error) = inner.fail_next_upsert.take() {
            return Err(error);
        }

        for entity in entities {
            inner.entities.insert(entity.id().to_string(), entity);
        }
        Ok(())
    }

    async fn all(&self) -> Result<Vec<T>, SyncError> {
        Ok(self.inner.lock().unwrap().entities.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltasync_types::Topic;

    fn topic(id: &str) -> Topic {
        Topic {
            id: id.into(),
            name: id.to_uppercase(),
            short_description: String::new(),
            long_description: String::new(),
            url: String::new(),
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn mock_cache_records_calls() {
        let cache = MockCache::<Topic>::new();
        cache.upsert_entities(vec![topic("a"), topic("b")]).await.unwrap();
        cache.delete_entities(&["a".to_string()]).await.unwrap();

        assert_eq!(
            cache.calls(),
            vec![
                CacheCall::Upsert(vec!["a".into(), "b".into()]),
                CacheCall::Delete(vec!["a".into()]),
            ]
        );
        assert_eq!(cache.ids(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn mock_cache_fails_once() {
        let cache = MockCache::<Topic>::new();
        cache.fail_next_upsert(SyncError::Storage("disk full".into()));

        let first = cache.upsert_entities(vec![topic("a")]).await;
        assert!(matches!(first, Err(SyncError::Storage(_))));
        assert!(cache.ids().is_empty());

        cache.upsert_entities(vec![topic("a")]).await.unwrap();
        assert_eq!(cache.ids(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let cache = MockCache::<Topic>::new();
        let handle = cache.clone();
        cache.upsert_entities(vec![topic("x")]).await.unwrap();
        assert_eq!(handle.ids(), vec!["x".to_string()]);
    }
}
