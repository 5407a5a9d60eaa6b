//! Remote source backed by a JSON fixture.
//!
//! Fixture shape:
//!
//! ```json
//! {
//!   "topics": [ { "id": "1", "name": "Headlines" } ],
//!   "newsResources": [ { "id": "125", "title": "...", "topics": ["1"] } ],
//!   "topicChangeList": [ { "id": "1", "changeListVersion": 1, "isDelete": false } ]
//! }
//! ```
//!
//! Change lists are optional. When absent, one is derived from the entity
//! list: every entity is an update, versions run `1..=n` in listed order.

use std::path::Path;

use async_trait::async_trait;
use deltasync_types::{Cursor, Entity, NetworkChangeList, NewsResource, SyncError, Topic};
use serde::Deserialize;

use super::RemoteDataSource;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DemoFixture {
    #[serde(default)]
    topics: Vec<Topic>,
    #[serde(default)]
    news_resources: Vec<NewsResource>,
    #[serde(default)]
    topic_change_list: Option<Vec<NetworkChangeList>>,
    #[serde(default)]
    news_resource_change_list: Option<Vec<NetworkChangeList>>,
}

/// Serves topics and news resources from a fixture loaded up front.
#[derive(Debug)]
pub struct DemoDataSource {
    topics: Vec<Topic>,
    news_resources: Vec<NewsResource>,
    topic_changes: Vec<NetworkChangeList>,
    news_resource_changes: Vec<NetworkChangeList>,
}

impl DemoDataSource {
    /// Parse a fixture from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        let fixture: DemoFixture = serde_json::from_str(json)
            .map_err(|e| SyncError::InvalidData(format!("demo fixture: {}", e)))?;

        let topic_changes = fixture
            .topic_change_list
            .unwrap_or_else(|| derive_change_list(&fixture.topics));
        let news_resource_changes = fixture
            .news_resource_change_list
            .unwrap_or_else(|| derive_change_list(&fixture.news_resources));

        Ok(Self {
            topics: fixture.topics,
            news_resources: fixture.news_resources,
            topic_changes,
            news_resource_changes,
        })
    }

    /// Load a fixture file.
    pub async fn from_file(path: &Path) -> Result<Self, SyncError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::Network(format!("read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

/// One update per entity, versions `1..=n`.
fn derive_change_list<T: Entity>(entities: &[T]) -> Vec<NetworkChangeList> {
    entities
        .iter()
        .zip(1u64..)
        .map(|(entity, version)| NetworkChangeList::updated(entity.id(), version))
        .collect()
}

fn changes_after(changes: &[NetworkChangeList], after: Cursor) -> Vec<NetworkChangeList> {
    changes
        .iter()
        .filter(|change| change.change_list_version > after)
        .cloned()
        .collect()
}

/// Entities matching `ids`, in the order the ids were requested.
fn select_by_id<T: Entity>(entities: &[T], ids: &[String]) -> Vec<T> {
    ids.iter()
        .filter_map(|id| entities.iter().find(|entity| entity.id() == id.as_str()))
        .cloned()
        .collect()
}

#[async_trait]
impl RemoteDataSource<Topic> for DemoDataSource {
    async fn change_list(&self, after: Cursor) -> Result<Vec<NetworkChangeList>, SyncError> {
        Ok(changes_after(&self.topic_changes, after))
    }

    async fn entities(&self, ids: &[String]) -> Result<Vec<Topic>, SyncError> {
        Ok(select_by_id(&self.topics, ids))
    }
}

#[async_trait]
impl RemoteDataSource<NewsResource> for DemoDataSource {
    async fn change_list(&self, after: Cursor) -> Result<Vec<NetworkChangeList>, SyncError> {
        Ok(changes_after(&self.news_resource_changes, after))
    }

    async fn entities(&self, ids: &[String]) -> Result<Vec<NewsResource>, SyncError> {
        Ok(select_by_id(&self.news_resources, ids))
    }
}
