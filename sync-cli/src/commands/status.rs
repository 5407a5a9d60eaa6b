//! Show sync status.

use anyhow::{Context, Result};
use deltasync_client::{ChangeListVersions, EntityType, LocalCache, VersionStore};
use std::path::Path;

use crate::state::DataDir;

/// Run the status command.
pub async fn run(data_dir: &Path) -> Result<()> {
    println!("=== deltasync status ===");
    println!();

    let state = DataDir::open(data_dir);
    let versions = state
        .version_store()
        .get_change_list_versions()
        .await
        .context("Failed to read cursors")?;

    let topics = state.topics().all().await.context("Failed to read topics")?;
    let news = state
        .news_resources()
        .all()
        .await
        .context("Failed to read news resources")?;

    println!("Data dir: {}", data_dir.display());
    println!();
    println!("Entity types:");
    for entity_type in EntityType::ALL {
        let cached = match entity_type {
            EntityType::Topic => topics.len(),
            EntityType::NewsResource => news.len(),
        };
        println!(
            "  {:<14} cursor {:<6} cached {}",
            entity_type.as_str(),
            versions.get(entity_type).to_string(),
            cached
        );
    }
    println!();

    let index_built = data_dir.join("search_index.json").exists();
    println!("{}", index_summary(&versions, index_built));

    Ok(())
}

/// One line describing the search index. The index file is only written by a
/// successful pass, so it may predate a later failed one.
fn index_summary(versions: &ChangeListVersions, index_built: bool) -> &'static str {
    let never_synced = EntityType::ALL
        .into_iter()
        .all(|entity_type| versions.get(entity_type).value() == 0);
    if never_synced {
        "Never synced. Run 'deltasync sync --remote <fixture.json>'."
    } else if index_built {
        "Search index: last built by a successful sync"
    } else {
        "Search index: NOT BUILT (no sync has completed)"
    }
}
