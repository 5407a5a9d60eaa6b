//! # sync-types
//!
//! Data model for deltasync, an offline-first change-list synchronizer.
//!
//! This crate provides the foundational types used across all deltasync crates:
//! - [`Cursor`], [`EntityType`] - Ordering and categorization
//! - [`ChangeListVersions`] - Per-entity-type cursor record
//! - [`NetworkChangeList`] - One change notification from the remote source
//! - [`Topic`], [`NewsResource`] - Synchronized entities
//! - [`SyncError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod change_list;
mod entities;
mod error;
mod ids;
mod versions;

pub use change_list::NetworkChangeList;
pub use entities::{Entity, NewsResource, Topic};
pub use error::SyncError;
pub use ids::{Cursor, EntityType, UnknownEntityType};
pub use versions::ChangeListVersions;
