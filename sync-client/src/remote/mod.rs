//! Remote source abstraction for deltasync.
//!
//! The synchronizer talks to the remote through [`RemoteDataSource`]: one
//! call for the change list after a cursor, one to fetch full entity bodies
//! by id. The HTTP client and wire format live behind this trait.
//!
//! Implementations:
//! - [`DemoDataSource`] serves a bundled JSON fixture (offline demos, CLI)
//! - [`MockDataSource`] scripts responses and injects failures (tests)

mod demo;
mod mock;

pub use demo::DemoDataSource;
pub use mock::MockDataSource;

use async_trait::async_trait;
use deltasync_types::{Cursor, Entity, NetworkChangeList, SyncError};

/// Remote source of one entity type.
#[async_trait]
pub trait RemoteDataSource<T: Entity>: Send + Sync {
    /// Every change with a version strictly greater than `after`, sorted
    /// ascending by version. Empty when the caller is up to date.
    async fn change_list(&self, after: Cursor) -> Result<Vec<NetworkChangeList>, SyncError>;

    /// Full bodies for `ids`. Ids unknown to the remote are skipped.
    async fn entities(&self, ids: &[String]) -> Result<Vec<T>, SyncError>;
}
