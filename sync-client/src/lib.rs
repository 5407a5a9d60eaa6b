//! # sync-client
//!
//! Offline-first change-list synchronization for deltasync.
//!
//! Applications keep a local cache per entity type and call into this crate
//! to bring it up to date with the remote. Each entity type has its own
//! cursor; a sync fetches the changes after it, deletes and refreshes the
//! affected rows, and only then moves the cursor.
//!
//! ## Features
//!
//! - **Change-list sync**: [`change_list_sync`] with cancellation kept apart
//!   from failure
//! - **Orchestration**: [`SyncWorker`] syncs every entity type concurrently
//!   and folds the results into [`WorkResult`]
//! - **Scheduling**: [`SyncScheduler`] runs one pass at a time and retries
//!   with backoff
//! - **Pluggable storage**: [`VersionStore`], [`LocalCache`] and
//!   [`RemoteDataSource`] with in-memory, JSON-file and mock implementations
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use deltasync_client::*;
//!
//! let remote = Arc::new(DemoDataSource::from_file(path).await?);
//! let synchronizer = Synchronizer::new(Arc::new(MemoryVersionStore::new()));
//! let topics = OfflineFirstRepository::<Topic>::new(remote.clone(), Arc::new(MemoryCache::new()));
//! let worker = SyncWorker::new(synchronizer, vec![Arc::new(topics)]);
//!
//! let result = worker.do_work(&CancellationToken::new()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod remote;
pub mod repository;
pub mod scheduler;
pub mod search;
pub mod store;
pub mod sync;
pub mod worker;

pub use config::{ConfigError, RetryConfig, SyncConfig, SyncSection};
pub use remote::{DemoDataSource, MockDataSource, RemoteDataSource};
pub use repository::{OfflineFirstRepository, Syncable, Synchronizer, DEFAULT_BATCH_SIZE};
pub use scheduler::{RunReport, SchedulerError, SyncScheduler};
pub use search::{JsonSearchIndex, SearchHit};
pub use store::{
    CacheCall, FileVersionStore, JsonFileCache, LocalCache, MemoryCache, MemoryVersionStore,
    MockCache, VersionStore, VersionTransform,
};
pub use sync::{change_list_sync, run_catching, Cancelled};
pub use worker::{SearchIndexer, SyncStatus, SyncWorker, WorkResult};

pub use deltasync_types::{
    ChangeListVersions, Cursor, Entity, EntityType, NetworkChangeList, NewsResource, SyncError,
    Topic,
};
pub use tokio_util::sync::CancellationToken;
