//! # sync-core
//!
//! Pure logic for deltasync (no I/O, instant tests).
//!
//! This crate implements the decisions behind change-list synchronization
//! without any network or disk I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects:
//! - [`batch`] turns a fetched change list into deletes, updates and a new cursor
//! - [`state`] folds per-entity-type results into one run outcome
//! - [`backoff`] spaces out scheduler retries
//!
//! The actual I/O (remote fetches, local writes, version store updates) is
//! performed by `sync-client`, which interprets the plans and actions
//! produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backoff;
pub mod batch;
pub mod state;

pub use backoff::RetryPolicy;
pub use batch::BatchPlan;
pub use state::{Action, Event, RunState, SyncEvent};
