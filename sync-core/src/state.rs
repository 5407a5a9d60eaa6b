//! Orchestration state machine for deltasync.
//!
//! One orchestration run syncs every tracked entity type and folds their
//! results into a single outcome. This module is the pure, side-effect-free
//! half of that: it takes events as input and produces a new state plus a
//! list of actions to execute.
//!
//! The actual I/O (launching entity syncs, rebuilding the search index) is
//! performed by sync-client, not by this module.

use std::collections::BTreeSet;

use deltasync_types::EntityType;

/// Orchestration run state - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// No run has started.
    Idle,
    /// Entity-type syncs are in flight.
    Running {
        /// Entity types that have not reported back yet.
        pending: BTreeSet<EntityType>,
        /// Entity types that reported failure.
        failed: BTreeSet<EntityType>,
    },
    /// Every entity type synced; waiting for the search index rebuild.
    Rebuilding,
    /// Every entity type synced and the index was rebuilt.
    Success,
    /// At least one step failed; the scheduler should run again later.
    Retry {
        /// Entity types that failed (empty if only the rebuild failed).
        failed: Vec<EntityType>,
    },
}

impl RunState {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (sync-client)
    /// is responsible for executing the returned actions.
    pub fn on_event(self, event: Event) -> (Self, Vec<Action>) {
        match (self, event) {
            // From Idle
            (Self::Idle, Event::Started { entity_types }) => {
                if entity_types.is_empty() {
                    return (
                        Self::Rebuilding,
                        vec![
                            Action::EmitEvent(SyncEvent::Started),
                            Action::RebuildSearchIndex,
                        ],
                    );
                }
                let pending: BTreeSet<EntityType> = entity_types.into_iter().collect();
                let mut actions = vec![Action::EmitEvent(SyncEvent::Started)];
                actions.extend(pending.iter().map(|&entity_type| Action::LaunchSync(entity_type)));
                (
                    Self::Running {
                        pending,
                        failed: BTreeSet::new(),
                    },
                    actions,
                )
            }

            // From Running
            (
                Self::Running {
                    mut pending,
                    mut failed,
                },
                Event::EntitySynced {
                    entity_type,
                    succeeded,
                },
            ) => {
                if !pending.remove(&entity_type) {
                    // Duplicate or unknown report
                    return (Self::Running { pending, failed }, vec![]);
                }
                if !succeeded {
                    failed.insert(entity_type);
                }
                let mut actions = vec![Action::EmitEvent(SyncEvent::EntityFinished {
                    entity_type,
                    succeeded,
                })];

                if !pending.is_empty() {
                    return (Self::Running { pending, failed }, actions);
                }

                if failed.is_empty() {
                    actions.push(Action::RebuildSearchIndex);
                    (Self::Rebuilding, actions)
                } else {
                    let failed: Vec<EntityType> = failed.into_iter().collect();
                    actions.push(Action::EmitEvent(SyncEvent::Finished { success: false }));
                    (Self::Retry { failed }, actions)
                }
            }

            // From Rebuilding
            (Self::Rebuilding, Event::IndexRebuilt { succeeded: true }) => (
                Self::Success,
                vec![Action::EmitEvent(SyncEvent::Finished { success: true })],
            ),
            (Self::Rebuilding, Event::IndexRebuilt { succeeded: false }) => (
                Self::Retry { failed: vec![] },
                vec![Action::EmitEvent(SyncEvent::Finished { success: false })],
            ),

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// True once the run reached `Success` or `Retry`.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Success | Self::Retry { .. })
    }

    /// True while entity syncs or the rebuild are in flight.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. } | Self::Rebuilding)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Events that can occur during an orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The scheduler started a run over these entity types.
    Started {
        /// Entity types to sync.
        entity_types: Vec<EntityType>,
    },
    /// One entity type finished.
    EntitySynced {
        /// Which entity type.
        entity_type: EntityType,
        /// Whether its sync succeeded.
        succeeded: bool,
    },
    /// The post-sync search index rebuild finished.
    IndexRebuilt {
        /// Whether the rebuild succeeded.
        succeeded: bool,
    },
}

/// Actions to be executed by sync-client.
///
/// These are instructions, not side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Launch the sync of one entity type.
    LaunchSync(EntityType),
    /// Rebuild the full-text search index.
    RebuildSearchIndex,
    /// Emit an event to observers.
    EmitEvent(SyncEvent),
}

/// Events emitted to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A run began.
    Started,
    /// One entity type reported back.
    EntityFinished {
        /// Which entity type.
        entity_type: EntityType,
        /// Whether its sync succeeded.
        succeeded: bool,
    },
    /// The run reached a terminal state.
    Finished {
        /// True for `Success`, false for `Retry`.
        success: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> (RunState, Vec<Action>) {
        RunState::new().on_event(Event::Started {
            entity_types: EntityType::ALL.to_vec(),
        })
    }

    #[test]
    fn starts_idle() {
        let state = RunState::new();
        assert!(matches!(state, RunState::Idle));
        assert!(!state.is_running());
        assert!(!state.is_finished());
    }

    #[test]
    fn start_launches_every_entity_type() {
        let (state, actions) = started();

        assert!(state.is_running());
        for entity_type in EntityType::ALL {
            assert!(actions.contains(&Action::LaunchSync(entity_type)));
        }
        assert!(actions.contains(&Action::EmitEvent(SyncEvent::Started)));
    }

    #[test]
    fn all_succeeded_rebuilds_then_succeeds() {
        let (state, _) = started();
        let (state, actions) = state.on_event(Event::EntitySynced {
            entity_type: EntityType::Topic,
            succeeded: true,
        });
        assert!(matches!(state, RunState::Running { .. }));
        assert!(!actions.contains(&Action::RebuildSearchIndex));

        let (state, actions) = state.on_event(Event::EntitySynced {
            entity_type: EntityType::NewsResource,
            succeeded: true,
        });
        assert!(matches!(state, RunState::Rebuilding));
        assert!(actions.contains(&Action::RebuildSearchIndex));

        let (state, actions) = state.on_event(Event::IndexRebuilt { succeeded: true });
        assert_eq!(state, RunState::Success);
        assert!(actions.contains(&Action::EmitEvent(SyncEvent::Finished { success: true })));
    }

    #[test]
    fn one_failure_means_retry_without_rebuild() {
        let (state, _) = started();
        let (state, _) = state.on_event(Event::EntitySynced {
            entity_type: EntityType::NewsResource,
            succeeded: false,
        });
        let (state, actions) = state.on_event(Event::EntitySynced {
            entity_type: EntityType::Topic,
            succeeded: true,
        });

        assert_eq!(
            state,
            RunState::Retry {
                failed: vec![EntityType::NewsResource]
            }
        );
        assert!(!actions.contains(&Action::RebuildSearchIndex));
        assert!(actions.contains(&Action::EmitEvent(SyncEvent::Finished { success: false })));
    }

    #[test]
    fn rebuild_failure_means_retry() {
        let (state, _) = started();
        let (state, _) = state.on_event(Event::EntitySynced {
            entity_type: EntityType::Topic,
            succeeded: true,
        });
        let (state, _) = state.on_event(Event::EntitySynced {
            entity_type: EntityType::NewsResource,
            succeeded: true,
        });
        let (state, _) = state.on_event(Event::IndexRebuilt { succeeded: false });

        assert_eq!(state, RunState::Retry { failed: vec![] });
        assert!(state.is_finished());
    }

    #[test]
    fn duplicate_report_is_ignored() {
        let (state, _) = started();
        let (state, _) = state.on_event(Event::EntitySynced {
            entity_type: EntityType::Topic,
            succeeded: false,
        });
        // A second report for the same type must not flip the outcome
        let (state, actions) = state.on_event(Event::EntitySynced {
            entity_type: EntityType::Topic,
            succeeded: true,
        });

        assert!(actions.is_empty());
        match state {
            RunState::Running { pending, failed } => {
                assert_eq!(pending.len(), 1);
                assert!(failed.contains(&EntityType::Topic));
            }
            other => panic!("Expected Running state, got {:?}", other),
        }
    }

    #[test]
    fn empty_run_goes_straight_to_rebuild() {
        let (state, actions) = RunState::new().on_event(Event::Started {
            entity_types: vec![],
        });
        assert!(matches!(state, RunState::Rebuilding));
        assert!(actions.contains(&Action::RebuildSearchIndex));
    }

    #[test]
    fn terminal_states_ignore_events() {
        let (state, actions) = RunState::Success.on_event(Event::Started {
            entity_types: EntityType::ALL.to_vec(),
        });
        assert_eq!(state, RunState::Success);
        assert!(actions.is_empty());
    }
}
