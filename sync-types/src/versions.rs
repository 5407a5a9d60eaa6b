//! Per-entity-type cursor record.

use serde::{Deserialize, Serialize};

use crate::{Cursor, EntityType};

/// The last synchronized change-list version of every tracked entity type.
///
/// Immutable: a new record is produced with [`with`](Self::with) and handed
/// back to the version store, which swaps it in atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeListVersions {
    /// Cursor for [`EntityType::Topic`].
    #[serde(default)]
    pub topic_version: Cursor,
    /// Cursor for [`EntityType::NewsResource`].
    #[serde(default)]
    pub news_resource_version: Cursor,
}

impl ChangeListVersions {
    /// Cursor stored for `entity_type`.
    pub fn get(&self, entity_type: EntityType) -> Cursor {
        match entity_type {
            EntityType::Topic => self.topic_version,
            EntityType::NewsResource => self.news_resource_version,
        }
    }

    /// Copy of this record with `entity_type` set to `cursor`.
    ///
    /// Other entity types' cursors are left untouched.
    pub fn with(self, entity_type: EntityType, cursor: Cursor) -> Self {
        match entity_type {
            EntityType::Topic => Self {
                topic_version: cursor,
                ..self
            },
            EntityType::NewsResource => Self {
                news_resource_version: cursor,
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_zero_for_every_type() {
        let versions = ChangeListVersions::default();
        for entity_type in EntityType::ALL {
            assert_eq!(versions.get(entity_type), Cursor::zero());
        }
    }

    #[test]
    fn with_only_touches_one_field() {
        let versions = ChangeListVersions::default()
            .with(EntityType::Topic, Cursor::new(3))
            .with(EntityType::NewsResource, Cursor::new(9));

        let bumped = versions.with(EntityType::Topic, Cursor::new(4));
        assert_eq!(bumped.get(EntityType::Topic), Cursor::new(4));
        assert_eq!(bumped.get(EntityType::NewsResource), Cursor::new(9));
        // Original is unchanged
        assert_eq!(versions.get(EntityType::Topic), Cursor::new(3));
    }

    #[test]
    fn json_shape_is_camel_case() {
        let versions = ChangeListVersions::default().with(EntityType::NewsResource, Cursor::new(12));
        let json = serde_json::to_value(versions).unwrap();
        assert_eq!(json["topicVersion"], 0);
        assert_eq!(json["newsResourceVersion"], 12);
    }

    #[test]
    fn missing_fields_deserialize_as_zero() {
        let versions: ChangeListVersions = serde_json::from_str(r#"{"topicVersion": 5}"#).unwrap();
        assert_eq!(versions.topic_version, Cursor::new(5));
        assert_eq!(versions.news_resource_version, Cursor::zero());
    }
}
