//! The change-list synchronization algorithm.
//!
//! [`change_list_sync`] reconciles one entity type's local cache with its
//! remote source. It is generic over entity shape: the caller supplies five
//! small functions that know how to read and write this entity type's cursor,
//! fetch its change list, and delete or refresh its local rows.
//!
//! # Ordering
//!
//! ```text
//! read cursor → fetch changes → delete → update → advance cursor
//! ```
//!
//! The cursor moves last, so any earlier failure leaves it at its previous
//! value and the next run resumes from the same point.

use std::future::Future;

use deltasync_core::BatchPlan;
use deltasync_types::{ChangeListVersions, Cursor, NetworkChangeList, SyncError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::VersionStore;

/// The enclosing scope cancelled the sync.
///
/// Never converted into a failure result; callers must propagate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sync cancelled")]
pub struct Cancelled;

impl From<Cancelled> for SyncError {
    fn from(_: Cancelled) -> Self {
        SyncError::Cancelled
    }
}

/// Run `work`, splitting cancellation off from every other error.
///
/// `Err(Cancelled)` when `work` reported [`SyncError::Cancelled`], otherwise
/// `Ok` with the work's own result.
pub async fn run_catching<T, F>(work: F) -> Result<Result<T, SyncError>, Cancelled>
where
    F: Future<Output = Result<T, SyncError>>,
{
    match work.await {
        Err(SyncError::Cancelled) => Err(Cancelled),
        other => Ok(other),
    }
}

/// Sync one entity type using its change list.
///
/// Returns `Ok(true)` when the local cache caught up (including the no-op
/// case of an empty change list), `Ok(false)` on any collaborator failure,
/// and `Err(Cancelled)` when a collaborator reported cancellation.
///
/// Must not run concurrently with itself for the same entity type; the
/// caller provides that guarantee.
pub async fn change_list_sync<R, F, FFut, W, D, DFut, U, UFut>(
    versions: &dyn VersionStore,
    version_reader: R,
    change_list_fetcher: F,
    version_updater: W,
    model_deleter: D,
    model_updater: U,
) -> Result<bool, Cancelled>
where
    R: FnOnce(&ChangeListVersions) -> Cursor,
    F: FnOnce(Cursor) -> FFut,
    FFut: Future<Output = Result<Vec<NetworkChangeList>, SyncError>>,
    W: FnOnce(ChangeListVersions, Cursor) -> ChangeListVersions + Send + 'static,
    D: FnOnce(Vec<String>) -> DFut,
    DFut: Future<Output = Result<(), SyncError>>,
    U: FnOnce(Vec<String>) -> UFut,
    UFut: Future<Output = Result<(), SyncError>>,
{
    let outcome = run_catching(async move {
        let current = version_reader(&versions.get_change_list_versions().await?);
        let changes = change_list_fetcher(current).await?;

        let Some(plan) = BatchPlan::from_changes(current, &changes) else {
            debug!(cursor = %current, "change list empty, nothing to sync");
            return Ok(());
        };

        if !plan.in_order {
            warn!(
                cursor = %current,
                latest = %plan.latest_version,
                "change list not sorted by version, using highest version seen"
            );
        }

        debug!(
            deleted = plan.deleted_ids.len(),
            updated = plan.updated_ids.len(),
            "applying change list"
        );
        model_deleter(plan.deleted_ids).await?;
        model_updater(plan.updated_ids).await?;

        let latest = plan.latest_version;
        versions
            .update_change_list_versions(Box::new(move |record| version_updater(record, latest)))
            .await?;

        info!(from = %current, to = %latest, "cursor advanced");
        Ok(())
    })
    .await?;

    match outcome {
        Ok(()) => Ok(true),
        Err(e) => {
            warn!(error = %e, "change list sync failed, cursor left unchanged");
            Ok(false)
        }
    }
}
