//! SyncWorker - runs one orchestration pass over every entity type.
//!
//! The worker drives the pure [`RunState`] machine from sync-core and
//! interprets its actions: entity-type syncs are launched as sibling tasks on
//! a [`JoinSet`], and the search index is rebuilt once all of them succeed.
//!
//! ```text
//! do_work → RunState → LaunchSync × n → JoinSet → RebuildSearchIndex
//!                                  ↓ (any failure)
//!                                Retry
//! ```
//!
//! Cancelling the token aborts every sibling task and surfaces as
//! `Err(Cancelled)`. A task that panics counts as a failed entity type.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use deltasync_core::{Action, Event, RunState, SyncEvent};
use deltasync_types::{EntityType, SyncError};
use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::repository::{Syncable, Synchronizer};
use crate::sync::{run_catching, Cancelled};

/// Outcome of one orchestration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkResult {
    /// Every entity type synced and the index was rebuilt.
    Success,
    /// Something failed; run again later.
    Retry,
}

/// Observable sync status for UI indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// No pass has run yet, or the last one was cancelled.
    #[default]
    Idle,
    /// A pass is in flight.
    Syncing,
    /// The last pass succeeded.
    Succeeded,
    /// The last pass ended in `Retry`.
    Failed,
}

/// Rebuilds derived search data after a successful pass.
#[async_trait]
pub trait SearchIndexer: Send + Sync {
    /// Rebuild the index from the local caches.
    async fn rebuild(&self) -> Result<(), SyncError>;
}

type EntityOutcome = (EntityType, Result<bool, Cancelled>);

/// Runs every registered syncable and folds the results.
pub struct SyncWorker {
    synchronizer: Synchronizer,
    syncables: Vec<Arc<dyn Syncable>>,
    search_indexer: Option<Arc<dyn SearchIndexer>>,
    status: watch::Sender<SyncStatus>,
}

impl SyncWorker {
    /// Worker over `syncables`, sharing `synchronizer`.
    pub fn new(synchronizer: Synchronizer, syncables: Vec<Arc<dyn Syncable>>) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            synchronizer,
            syncables,
            search_indexer: None,
            status,
        }
    }

    /// Rebuild `indexer` after every successful pass.
    pub fn with_search_indexer(mut self, indexer: Arc<dyn SearchIndexer>) -> Self {
        self.search_indexer = Some(indexer);
        self
    }

    /// Watch the sync status.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Current sync status.
    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    /// Run one pass: sync every entity type concurrently, then rebuild the
    /// search index if all of them succeeded.
    pub async fn do_work(&self, token: &CancellationToken) -> Result<WorkResult, Cancelled> {
        if token.is_cancelled() {
            return Err(Cancelled);
        }

        let mut entity_types: Vec<EntityType> =
            self.syncables.iter().map(|s| s.entity_type()).collect();
        entity_types.sort();
        entity_types.dedup();

        let mut tasks: JoinSet<EntityOutcome> = JoinSet::new();
        let result = self.drive(entity_types, &mut tasks, token).await;

        if result.is_err() {
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
            self.status.send_replace(SyncStatus::Idle);
            info!("sync pass cancelled");
        }
        result
    }

    async fn drive(
        &self,
        entity_types: Vec<EntityType>,
        tasks: &mut JoinSet<EntityOutcome>,
        token: &CancellationToken,
    ) -> Result<WorkResult, Cancelled> {
        let (mut state, actions) = RunState::new().on_event(Event::Started { entity_types });
        let mut queue: VecDeque<Action> = actions.into();

        loop {
            while let Some(action) = queue.pop_front() {
                match action {
                    Action::LaunchSync(entity_type) => self.launch(tasks, entity_type),
                    Action::RebuildSearchIndex => {
                        let succeeded = self.rebuild_search_index(token).await?;
                        let (next, actions) = state.on_event(Event::IndexRebuilt { succeeded });
                        state = next;
                        queue.extend(actions);
                    }
                    Action::EmitEvent(event) => self.emit(event),
                }
            }

            match state {
                RunState::Success => return Ok(WorkResult::Success),
                RunState::Retry { .. } => return Ok(WorkResult::Retry),
                _ => {}
            }

            let joined = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Cancelled),
                joined = tasks.join_next() => joined,
            };

            let Some(joined) = joined else {
                warn!(?state, "no sync tasks left but pass not finished");
                return Ok(WorkResult::Retry);
            };

            let (entity_type, outcome) = unwrap_join(joined)?;
            let succeeded = outcome?;
            let (next, actions) = state.on_event(Event::EntitySynced {
                entity_type,
                succeeded,
            });
            state = next;
            queue.extend(actions);
        }
    }

    /// Spawn one task syncing every syncable of `entity_type` in turn.
    fn launch(&self, tasks: &mut JoinSet<EntityOutcome>, entity_type: EntityType) {
        let syncables: Vec<Arc<dyn Syncable>> = self
            .syncables
            .iter()
            .filter(|s| s.entity_type() == entity_type)
            .cloned()
            .collect();
        let synchronizer = self.synchronizer.clone();

        debug!(%entity_type, "launching sync");
        tasks.spawn(async move {
            let run = async {
                let mut all_succeeded = true;
                for syncable in &syncables {
                    all_succeeded &= synchronizer.sync(syncable.as_ref()).await?;
                }
                Ok::<_, Cancelled>(all_succeeded)
            };

            let outcome = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(%entity_type, "sync task panicked, counting as failure");
                    Ok(false)
                }
            };
            (entity_type, outcome)
        });
    }

    async fn rebuild_search_index(&self, token: &CancellationToken) -> Result<bool, Cancelled> {
        let Some(indexer) = &self.search_indexer else {
            return Ok(true);
        };

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Cancelled),
            outcome = run_catching(indexer.rebuild()) => outcome?,
        };

        match outcome {
            Ok(()) => {
                debug!("search index rebuilt");
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "search index rebuild failed");
                Ok(false)
            }
        }
    }

    fn emit(&self, event: SyncEvent) {
        match event {
            SyncEvent::Started => {
                info!(entity_types = self.syncables.len(), "sync pass started");
                self.status.send_replace(SyncStatus::Syncing);
            }
            SyncEvent::EntityFinished {
                entity_type,
                succeeded,
            } => {
                debug!(%entity_type, succeeded, "entity type finished");
            }
            SyncEvent::Finished { success } => {
                info!(success, "sync pass finished");
                self.status.send_replace(if success {
                    SyncStatus::Succeeded
                } else {
                    SyncStatus::Failed
                });
            }
        }
    }
}

/// Map a task join result; only our own abort can cancel a task.
fn unwrap_join(joined: Result<EntityOutcome, JoinError>) -> Result<EntityOutcome, Cancelled> {
    match joined {
        Ok(outcome) => Ok(outcome),
        Err(e) if e.is_cancelled() => Err(Cancelled),
        // Panics are caught inside the task; anything else is a runtime bug
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}
