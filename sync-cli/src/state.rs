//! Local state layout for deltasync.
//!
//! Everything lives in one data directory:
//!
//! ```text
//! <data-dir>/
//!   versions.json         per-entity-type cursors
//!   topics.json           cached topics
//!   news_resources.json   cached news resources
//!   search_index.json     word index rebuilt after each successful sync
//!   sync.toml             optional configuration
//! ```

use anyhow::{Context, Result};
use deltasync_client::{
    FileVersionStore, JsonFileCache, JsonSearchIndex, LocalCache, NewsResource, SyncConfig, Topic,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Handles onto the files under one data directory.
pub struct DataDir {
    root: PathBuf,
    topics: Arc<JsonFileCache<Topic>>,
    news_resources: Arc<JsonFileCache<NewsResource>>,
}

impl DataDir {
    /// Open the layout under `root`. Files are created lazily on first write.
    pub fn open(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            topics: Arc::new(JsonFileCache::new(root.join("topics.json"))),
            news_resources: Arc::new(JsonFileCache::new(root.join("news_resources.json"))),
        }
    }

    /// Cursor store.
    pub fn version_store(&self) -> FileVersionStore {
        FileVersionStore::new(self.root.join("versions.json"))
    }

    /// Topic cache.
    pub fn topics(&self) -> Arc<JsonFileCache<Topic>> {
        Arc::clone(&self.topics)
    }

    /// News resource cache.
    pub fn news_resources(&self) -> Arc<JsonFileCache<NewsResource>> {
        Arc::clone(&self.news_resources)
    }

    /// Search index over both caches.
    pub fn search_index(&self) -> JsonSearchIndex {
        let topics: Arc<dyn LocalCache<Topic>> = self.topics();
        let news_resources: Arc<dyn LocalCache<NewsResource>> = self.news_resources();
        JsonSearchIndex::new(self.root.join("search_index.json"), topics, news_resources)
    }

    /// Load configuration from `explicit`, else `<data-dir>/sync.toml` if it
    /// exists, else defaults.
    pub fn load_config(&self, explicit: Option<&Path>) -> Result<SyncConfig> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = self.root.join("sync.toml");
                if !default.exists() {
                    return Ok(SyncConfig::default());
                }
                default
            }
        };
        SyncConfig::from_file(&path).context("Failed to load configuration")
    }
}
