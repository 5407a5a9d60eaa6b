//! Change notifications delivered by the remote source.

use serde::{Deserialize, Serialize};

use crate::Cursor;

/// A single change record for one entity.
///
/// Batches are returned sorted ascending by `change_list_version`; later
/// changes always carry a strictly greater version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkChangeList {
    /// Id of the changed entity.
    pub id: String,
    /// Version at which the change happened.
    pub change_list_version: Cursor,
    /// True when the entity was deleted, false when created or updated.
    #[serde(default)]
    pub is_delete: bool,
}

impl NetworkChangeList {
    /// A create-or-update change.
    pub fn updated(id: impl Into<String>, version: u64) -> Self {
        Self {
            id: id.into(),
            change_list_version: Cursor::new(version),
            is_delete: false,
        }
    }

    /// A deletion.
    pub fn deleted(id: impl Into<String>, version: u64) -> Self {
        Self {
            id: id.into(),
            change_list_version: Cursor::new(version),
            is_delete: true,
        }
    }
}
