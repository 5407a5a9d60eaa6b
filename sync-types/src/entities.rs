//! Synchronized domain records.
//!
//! The sync algorithm only ever touches these by id; the remaining fields
//! are carried through to the local cache and the search index.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::EntityType;

/// A record that can be synchronized by id.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The entity type whose cursor tracks this record.
    const ENTITY_TYPE: EntityType;

    /// Stable id shared by the remote source and the local cache.
    fn id(&self) -> &str;

    /// Free text fed to the search index.
    fn search_text(&self) -> String;
}

/// A followable topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Topic id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    #[serde(default)]
    pub short_description: String,
    /// Full description.
    #[serde(default)]
    pub long_description: String,
    /// Link to the topic page.
    #[serde(default)]
    pub url: String,
    /// Icon image.
    #[serde(default)]
    pub image_url: String,
}

impl Entity for Topic {
    const ENTITY_TYPE: EntityType = EntityType::Topic;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.short_description, self.long_description)
    }
}

/// A news article, video or other published resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResource {
    /// Resource id.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Summary text.
    #[serde(default)]
    pub content: String,
    /// Link to the full resource.
    #[serde(default)]
    pub url: String,
    /// Optional header image.
    #[serde(default)]
    pub header_image_url: Option<String>,
    /// Publication time as delivered by the remote (RFC 3339).
    #[serde(default)]
    pub publish_date: String,
    /// Kind of resource ("Article", "Video", ...).
    #[serde(default, rename = "type")]
    pub resource_type: String,
    /// Ids of the topics this resource belongs to.
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Entity for NewsResource {
    const ENTITY_TYPE: EntityType = EntityType::NewsResource;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn news_resource_parses_remote_json() {
        let json = r#"{
            "id": "n1",
            "title": "Compose 1.0",
            "content": "Stable release",
            "url": "https://example.com/n1",
            "headerImageUrl": null,
            "publishDate": "2021-07-28T00:00:00Z",
            "type": "Article",
            "topics": ["t1", "t3"]
        }"#;
        let resource: NewsResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.id(), "n1");
        assert_eq!(resource.resource_type, "Article");
        assert_eq!(resource.topics, vec!["t1", "t3"]);
        assert_eq!(NewsResource::ENTITY_TYPE, EntityType::NewsResource);
    }

    #[test]
    fn topic_optional_fields_default() {
        let topic: Topic = serde_json::from_str(r#"{"id": "t1", "name": "Headlines"}"#).unwrap();
        assert_eq!(topic.id(), "t1");
        assert!(topic.url.is_empty());
        assert!(topic.search_text().contains("Headlines"));
    }
}
