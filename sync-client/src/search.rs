//! Word index over the local caches, stored as a JSON file.
//!
//! Rebuilt from scratch after every successful sync pass. Words are the
//! lowercase alphanumeric runs of each entity's searchable text.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use deltasync_types::{Entity, EntityType, NewsResource, SyncError, Topic};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{read_json, write_json, LocalCache};
use crate::worker::SearchIndexer;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Kind of entity matched.
    pub entity_type: EntityType,
    /// Its id.
    pub id: String,
}

type WordIndex = BTreeMap<String, BTreeSet<SearchHit>>;

/// Search index over cached topics and news resources.
pub struct JsonSearchIndex {
    path: PathBuf,
    topics: Arc<dyn LocalCache<Topic>>,
    news_resources: Arc<dyn LocalCache<NewsResource>>,
}

impl JsonSearchIndex {
    /// Index stored at `path`, built from the given caches.
    pub fn new(
        path: impl Into<PathBuf>,
        topics: Arc<dyn LocalCache<Topic>>,
        news_resources: Arc<dyn LocalCache<NewsResource>>,
    ) -> Self {
        Self {
            path: path.into(),
            topics,
            news_resources,
        }
    }

    /// Path of the index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entities containing every word of `term`. Empty if the index has not
    /// been built yet.
    pub async fn search(&self, term: &str) -> Result<Vec<SearchHit>, SyncError> {
        let index: WordIndex = read_json(&self.path).await?.unwrap_or_default();

        let mut matches: Option<BTreeSet<SearchHit>> = None;
        for word in words(term) {
            let hits = index.get(&word).cloned().unwrap_or_default();
            matches = Some(match matches {
                Some(found) => found.intersection(&hits).cloned().collect(),
                None => hits,
            });
        }
        Ok(matches.unwrap_or_default().into_iter().collect())
    }
}

#[async_trait]
impl SearchIndexer for JsonSearchIndex {
    async fn rebuild(&self) -> Result<(), SyncError> {
        let mut index = WordIndex::new();
        add_all(&mut index, self.topics.all().await?);
        add_all(&mut index, self.news_resources.all().await?);

        debug!(words = index.len(), path = %self.path.display(), "writing search index");
        write_json(&self.path, &index).await
    }
}

fn add_all<T: Entity>(index: &mut WordIndex, entities: Vec<T>) {
    for entity in entities {
        let hit = SearchHit {
            entity_type: T::ENTITY_TYPE,
            id: entity.id().to_string(),
        };
        for word in words(&entity.search_text()) {
            index.entry(word).or_default().insert(hit.clone());
        }
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCache;
    use tempfile::tempdir;

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

    fn resource(id: &str, title: &str, content: &str) -> NewsResource {
        NewsResource {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            url: String::new(),
            header_image_url: None,
            publish_date: String::new(),
            resource_type: "Article".into(),
            topics: vec![],
        }
    }

    async fn built_index(dir: &Path) -> JsonSearchIndex {
        let topics = MemoryCache::with_entities(vec![topic("1", "Jetpack Compose")]);
        let news = MemoryCache::with_entities(vec![
            resource("n1", "Compose 1.4 released", "Lazy layouts got faster."),
            resource("n2", "Testing Room", "Room migrations, tested."),
        ]);
        let index = JsonSearchIndex::new(
            dir.join("search_index.json"),
            Arc::new(topics),
            Arc::new(news),
        );
        index.rebuild().await.unwrap();
        index
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_types() {
        let dir = tempdir().unwrap();
        let index = built_index(dir.path()).await;

        let hits = index.search("COMPOSE").await.unwrap();
        assert_eq!(
            hits,
            vec![
                SearchHit {
                    entity_type: EntityType::Topic,
                    id: "1".into()
                },
                SearchHit {
                    entity_type: EntityType::NewsResource,
                    id: "n1".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn every_word_must_match() {
        let dir = tempdir().unwrap();
        let index = built_index(dir.path()).await;

        let hits = index.search("room migrations").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "n2");

        assert!(index.search("room compose").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_index_finds_nothing() {
        let dir = tempdir().unwrap();
        let index = JsonSearchIndex::new(
            dir.path().join("search_index.json"),
            Arc::new(MemoryCache::<Topic>::new()),
            Arc::new(MemoryCache::<NewsResource>::new()),
        );
        assert!(index.search("anything").await.unwrap().is_empty());
        assert!(index.search("").await.unwrap().is_empty());
    }
}
