//! Change-list batch planning for deltasync.
//!
//! Given the stored cursor and a freshly fetched change list, this module
//! decides which ids to delete, which to refresh, and where the cursor
//! lands once both have been applied. No I/O happens here.

use deltasync_types::{Cursor, NetworkChangeList};

/// What applying one fetched change list involves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    /// Ids to delete locally, in the order the remote listed them.
    pub deleted_ids: Vec<String>,
    /// Ids to fetch and upsert, in the order the remote listed them.
    pub updated_ids: Vec<String>,
    /// Cursor to store after deletes and updates succeed.
    pub latest_version: Cursor,
    /// False when the remote returned versions out of ascending order.
    pub in_order: bool,
}

impl BatchPlan {
    /// Plan a batch. Returns `None` for an empty change list.
    ///
    /// The new cursor is the highest version in the batch, never lower than
    /// `current`. For a correctly sorted batch that is simply the version of
    /// the last element.
    pub fn from_changes(current: Cursor, changes: &[NetworkChangeList]) -> Option<Self> {
        let last = changes.last()?;

        let (deleted, updated): (Vec<&NetworkChangeList>, Vec<&NetworkChangeList>) =
            changes.iter().partition(|change| change.is_delete);

        let in_order = changes
            .windows(2)
            .all(|pair| pair[0].change_list_version < pair[1].change_list_version);

        let highest = changes
            .iter()
            .map(|change| change.change_list_version)
            .max()
            .unwrap_or(last.change_list_version);

        Some(Self {
            deleted_ids: deleted.into_iter().map(|c| c.id.clone()).collect(),
            updated_ids: updated.into_iter().map(|c| c.id.clone()).collect(),
            latest_version: highest.max(current),
            in_order,
        })
    }

    /// Number of changes covered by this plan.
    pub fn len(&self) -> usize {
        self.deleted_ids.len() + self.updated_ids.len()
    }

    /// True when the plan covers no changes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
