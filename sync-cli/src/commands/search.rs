//! Search the synced caches.

use anyhow::{Context, Result};
use deltasync_client::{EntityType, LocalCache, SearchHit};
use std::collections::HashMap;
use std::path::Path;

use crate::state::DataDir;

/// Run the search command.
pub async fn run(data_dir: &Path, term: &str) -> Result<()> {
    let hits = find(data_dir, term).await?;
    if hits.is_empty() {
        println!("No matches for '{}'.", term);
        return Ok(());
    }

    println!("{} match(es) for '{}':", hits.len(), term);
    for (hit, label) in hits {
        println!("  [{}] {}  {}", hit.entity_type.as_str(), hit.id, label);
    }
    Ok(())
}

/// Hits for `term`, each paired with its display name.
pub async fn find(data_dir: &Path, term: &str) -> Result<Vec<(SearchHit, String)>> {
    let state = DataDir::open(data_dir);
    let hits = state
        .search_index()
        .search(term)
        .await
        .context("Failed to read search index")?;

    let mut labels: HashMap<(EntityType, String), String> = HashMap::new();
    for topic in state.topics().all().await? {
        labels.insert((EntityType::Topic, topic.id), topic.name);
    }
    for resource in state.news_resources().all().await? {
        labels.insert((EntityType::NewsResource, resource.id), resource.title);
    }

    Ok(hits
        .into_iter()
        .map(|hit| {
            let label = labels
                .get(&(hit.entity_type, hit.id.clone()))
                .cloned()
                .unwrap_or_default();
            (hit, label)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sync::sync_once;
    use deltasync_client::CancellationToken;
    use tempfile::tempdir;

    const FIXTURE: &str = r#"{
        "topics": [
            {"id": "2", "name": "UI", "longDescription": "Compose and Material Design"},
            {"id": "3", "name": "Testing"}
        ],
        "newsResources": [
            {"id": "125", "title": "Android Basics with Compose", "content": "Learn to build apps"}
        ]
    }"#;

    #[tokio::test]
    async fn finds_synced_entities_with_labels() {
        let dir = tempdir().unwrap();
        let fixture = dir.path().join("remote.json");
        std::fs::write(&fixture, FIXTURE).unwrap();
        sync_once(dir.path(), &fixture, None, &CancellationToken::new())
            .await
            .unwrap();

        let hits = find(dir.path(), "compose").await.unwrap();
        let labels: Vec<&str> = hits.iter().map(|(_, label)| label.as_str()).collect();
        assert_eq!(labels, vec!["UI", "Android Basics with Compose"]);

        assert!(run(dir.path(), "testing").await.is_ok());
    }

    #[tokio::test]
    async fn search_before_sync_finds_nothing() {
        let dir = tempdir().unwrap();
        assert!(find(dir.path(), "compose").await.unwrap().is_empty());
    }
}
