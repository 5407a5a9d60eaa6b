//! Ordering and categorization types for deltasync.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A monotonically increasing change-list version.
///
/// Assigned by the remote source, not by clients. A stored cursor records
/// the last version whose batch was fully applied locally.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Cursor(u64);

impl Cursor {
    /// Create a new Cursor with the given value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this Cursor.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Create a Cursor representing "nothing synced yet".
    pub fn zero() -> Self {
        Self(0)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({})", self.0)
    }
}

/// A category of synchronized object with its own independent cursor.
///
/// Closed set: adding a variant means adding a field to
/// [`ChangeListVersions`](crate::ChangeListVersions) as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Followable topics.
    Topic,
    /// News articles, videos and other resources.
    NewsResource,
}

impl EntityType {
    /// Every tracked entity type.
    pub const ALL: [EntityType; 2] = [EntityType::Topic, EntityType::NewsResource];

    /// Stable lowercase name, used in logs and file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::NewsResource => "news_resource",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown entity type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type: {0}")]
pub struct UnknownEntityType(pub String);

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topic" => Ok(Self::Topic),
            "news_resource" => Ok(Self::NewsResource),
            other => Err(UnknownEntityType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_ordering() {
        let c1 = Cursor::new(100);
        let c2 = Cursor::new(200);
        assert!(c1 < c2);
        assert!(c2 > c1);
        assert_eq!(c1.max(c2), c2);
    }

    #[test]
    fn cursor_zero_is_default() {
        assert_eq!(Cursor::zero(), Cursor::default());
        assert_eq!(Cursor::zero().value(), 0);
    }

    #[test]
    fn cursor_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Cursor::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: Cursor = serde_json::from_str("7").unwrap();
        assert_eq!(back, Cursor::new(7));
    }

    #[test]
    fn entity_type_as_str_and_from_str() {
        assert_eq!(EntityType::Topic.as_str(), "topic");
        assert_eq!(EntityType::NewsResource.as_str(), "news_resource");
        assert_eq!("topic".parse::<EntityType>().unwrap(), EntityType::Topic);
        assert_eq!(
            "news_resource".parse::<EntityType>().unwrap(),
            EntityType::NewsResource
        );
        let err = "author".parse::<EntityType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown entity type: author");
    }

    #[test]
    fn all_lists_each_type_once() {
        assert_eq!(EntityType::ALL.len(), 2);
        assert_ne!(EntityType::ALL[0], EntityType::ALL[1]);
    }
}
