//! Sync the local caches with a remote fixture.

use anyhow::{Context, Result};
use deltasync_client::{
    CancellationToken, DemoDataSource, EntityType, NewsResource, OfflineFirstRepository,
    RemoteDataSource, RunReport, SchedulerError, SyncConfig, SyncScheduler, SyncWorker, Syncable,
    Synchronizer, Topic, VersionStore, WorkResult,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::state::DataDir;

/// Run the sync command. Ctrl-C cancels the run.
pub async fn run(data_dir: &Path, remote: &Path, config: Option<&Path>) -> Result<()> {
    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling sync");
            on_interrupt.cancel();
        }
    });

    let report = sync_once(data_dir, remote, config, &token).await?;
    match report.result {
        WorkResult::Success => {
            println!("Sync complete ({} attempt(s)).", report.attempts);
        }
        WorkResult::Retry => {
            anyhow::bail!(
                "Sync incomplete after {} attempt(s); run again to resume",
                report.attempts
            );
        }
    }

    let versions = DataDir::open(data_dir)
        .version_store()
        .get_change_list_versions()
        .await?;
    for entity_type in EntityType::ALL {
        println!("  {:<14} cursor {}", entity_type.as_str(), versions.get(entity_type));
    }
    Ok(())
}

/// One scheduled sync run against the fixture at `remote`.
pub async fn sync_once(
    data_dir: &Path,
    remote: &Path,
    config: Option<&Path>,
    token: &CancellationToken,
) -> Result<RunReport> {
    let state = DataDir::open(data_dir);
    let config: SyncConfig = state.load_config(config)?;
    info!(
        data_dir = %data_dir.display(),
        remote = %remote.display(),
        batch_size = config.sync.batch_size,
        "starting sync"
    );

    let source = Arc::new(
        DemoDataSource::from_file(remote)
            .await
            .with_context(|| format!("Failed to load remote fixture {}", remote.display()))?,
    );
    let topic_remote: Arc<dyn RemoteDataSource<Topic>> = source.clone();
    let news_remote: Arc<dyn RemoteDataSource<NewsResource>> = source;

    let batch_size = config.sync.batch_size;
    let syncables: Vec<Arc<dyn Syncable>> = vec![
        Arc::new(
            OfflineFirstRepository::new(topic_remote, state.topics()).with_batch_size(batch_size),
        ),
        Arc::new(
            OfflineFirstRepository::new(news_remote, state.news_resources())
                .with_batch_size(batch_size),
        ),
    ];

    let synchronizer = Synchronizer::new(Arc::new(state.version_store()));
    let worker = SyncWorker::new(synchronizer, syncables)
        .with_search_indexer(Arc::new(state.search_index()));
    let scheduler = SyncScheduler::new(Arc::new(worker), config.retry.policy());

    match scheduler.run(token).await {
        Ok(report) => Ok(report),
        Err(SchedulerError::Cancelled(_)) => anyhow::bail!("Sync cancelled"),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltasync_client::{Cursor, LocalCache};
    use tempfile::tempdir;

    const FIXTURE: &str = r#"{
        "topics": [
            {"id": "1", "name": "Headlines", "shortDescription": "News you'll definitely be interested in"},
            {"id": "2", "name": "UI", "shortDescription": "Material Design, Navigation, Text, Paging"}
        ],
        "newsResources": [
            {"id": "125", "title": "Android Basics with Compose", "content": "Learn to build apps", "topics": ["2"]}
        ],
        "newsResourceChangeList": [
            {"id": "125", "changeListVersion": 12, "isDelete": false},
            {"id": "old", "changeListVersion": 13, "isDelete": true}
        ]
    }"#;

    #[tokio::test]
    async fn sync_fills_caches_and_cursors() {
        let dir = tempdir().unwrap();
        let fixture = dir.path().join("remote.json");
        std::fs::write(&fixture, FIXTURE).unwrap();

        let report = sync_once(dir.path(), &fixture, None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.result, WorkResult::Success);

        let state = DataDir::open(dir.path());
        assert_eq!(state.topics().all().await.unwrap().len(), 2);
        assert_eq!(state.news_resources().all().await.unwrap().len(), 1);

        let versions = state.version_store().get_change_list_versions().await.unwrap();
        assert_eq!(versions.get(EntityType::Topic), Cursor::new(2));
        assert_eq!(versions.get(EntityType::NewsResource), Cursor::new(13));
        assert!(dir.path().join("search_index.json").exists());
    }

    #[tokio::test]
    async fn second_sync_is_a_no_op() {
        let dir = tempdir().unwrap();
        let fixture = dir.path().join("remote.json");
        std::fs::write(&fixture, FIXTURE).unwrap();
        let token = CancellationToken::new();

        sync_once(dir.path(), &fixture, None, &token).await.unwrap();
        let before = std::fs::read(dir.path().join("versions.json")).unwrap();
        sync_once(dir.path(), &fixture, None, &token).await.unwrap();
        let after = std::fs::read(dir.path().join("versions.json")).unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn missing_fixture_is_an_error() {
        let dir = tempdir().unwrap();
        let result = sync_once(
            dir.path(),
            &dir.path().join("nope.json"),
            None,
            &CancellationToken::new(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn cancelled_token_aborts() {
        let dir = tempdir().unwrap();
        let fixture = dir.path().join("remote.json");
        std::fs::write(&fixture, FIXTURE).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let err = sync_once(dir.path(), &fixture, None, &token)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cancelled"));
        assert!(!dir.path().join("versions.json").exists());
    }
}
