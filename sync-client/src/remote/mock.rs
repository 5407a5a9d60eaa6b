//! Mock remote source for testing.
//!
//! Holds an append-only change log and entity bodies, records every call,
//! and can be told to fail or override the next response.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deltasync_types::{Cursor, Entity, NetworkChangeList, SyncError};

use super::RemoteDataSource;

/// Mock remote source for testing.
///
/// Clones share state.
pub struct MockDataSource<T> {
    inner: Arc<Mutex<MockDataSourceInner<T>>>,
}

struct MockDataSourceInner<T> {
    change_log: Vec<NetworkChangeList>,
    entities: BTreeMap<String, T>,
    scripted_change_lists: VecDeque<Vec<NetworkChangeList>>,
    change_list_calls: Vec<Cursor>,
    entities_calls: Vec<Vec<String>>,
    fail_next_change_list: Option<SyncError>,
    fail_next_entities: Option<SyncError>,
}

impl<T> Default for MockDataSource<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockDataSourceInner {
                change_log: Vec::new(),
                entities: BTreeMap::new(),
                scripted_change_lists: VecDeque::new(),
                change_list_calls: Vec::new(),
                entities_calls: Vec::new(),
                fail_next_change_list: None,
                fail_next_entities: None,
            })),
        }
    }
}

impl<T> Clone for MockDataSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> MockDataSource<T> {
    /// Create an empty mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new or changed entity at `version`.
    pub fn upsert(&self, entity: T, version: u64) {
        let mut inner = self.inner.lock().unwrap();
        let id = entity.id().to_string();
        inner
            .change_log
            .push(NetworkChangeList::updated(id.clone(), version));
        inner.entities.insert(id, entity);
    }

    /// Publish a deletion at `version`.
    pub fn delete(&self, id: &str, version: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.change_log.push(NetworkChangeList::deleted(id, version));
        inner.entities.remove(id);
    }

    /// Return exactly `changes` from the next `change_list()` call,
    /// bypassing the change log.
    pub fn queue_change_list(&self, changes: Vec<NetworkChangeList>) {
        self.inner
            .lock()
            .unwrap()
            .scripted_change_lists
            .push_back(changes);
    }

    /// Cause the next `change_list()` to fail with `error`.
    pub fn fail_next_change_list(&self, error: SyncError) {
        self.inner.lock().unwrap().fail_next_change_list = Some(error);
    }

    /// Cause the next `entities()` to fail with `error`.
    pub fn fail_next_entities(&self, error: SyncError) {
        self.inner.lock().unwrap().fail_next_entities = Some(error);
    }

    /// Cursors passed to `change_list()` so far.
    pub fn change_list_calls(&self) -> Vec<Cursor> {
        self.inner.lock().unwrap().change_list_calls.clone()
    }

    /// Id lists passed to `entities()` so far.
    pub fn entities_calls(&self) -> Vec<Vec<String>> {
        self.inner.lock().unwrap().entities_calls.clone()
    }
}

#[async_trait]
impl<T: Entity> RemoteDataSource<T> for MockDataSource<T> {
    async fn change_list(&self, after: Cursor) -> Result<Vec<NetworkChangeList>, SyncError> {
        let mut inner = self.inner.lock().unwrap();
        inner.change_list_calls.push(after);

        if let Some(error) = inner.fail_next_change_list.take() {
            return Err(error);
        }
        if let Some(scripted) = inner.scripted_change_lists.pop_front() {
            return Ok(scripted);
        }

        Ok(inner
            .change_log
            .iter()
            .filter(|change| change.change_list_version > after)
            .cloned()
            .collect())
    }

    async fn entities(&self, ids: &[String]) -> Result<Vec<T>, SyncError> {
        let mut inner = self.inner.lock().unwrap();
        inner.entities_calls.push(ids.to_vec());

        if let Some(error) = inner.fail_next_entities.take() {
            return Err(error);
        }

        Ok(ids
            .iter()
            .filter_map(|id| inner.entities.get(id).cloned())
            .collect())
    }
}
