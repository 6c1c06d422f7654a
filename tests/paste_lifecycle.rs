//! End-to-end lifecycle checks across the store, coordinator, sweeper, and service.

use async_trait::async_trait;
use chrono::Duration;
use priggr::{
    highlight::{HighlightError, Highlighter},
    AppError, Database, ExpirationSweeper, ExpiryMode, HighlightAdapter, PasteService,
    RetrievalCoordinator, SupportedTags, SweepReport,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tempfile::TempDir;

struct SlowHighlighter;

#[async_trait]
impl Highlighter for SlowHighlighter {
    async fn list_supported_tags(&self) -> Result<BTreeSet<String>, HighlightError> {
        Ok(BTreeSet::from(["rust".to_string()]))
    }

    async fn render(&self, _content: &str, _tag: &str) -> Result<String, HighlightError> {
        tokio::time::sleep(StdDuration::from_secs(30)).await;
        Ok("never returned".to_string())
    }
}

fn open_db() -> (Arc<Database>, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let db = Database::new(dir.path().join("db").to_str().expect("path")).expect("db");
    (Arc::new(db), dir)
}

fn service(db: Arc<Database>, timeout: StdDuration) -> PasteService {
    let tags = Arc::new(SupportedTags::new(BTreeSet::from(["rust".to_string()])));
    let adapter = HighlightAdapter::new(Arc::new(SlowHighlighter), tags, timeout);
    PasteService::new(db, adapter, 1024 * 1024)
}

#[test]
fn ttl_paste_is_hidden_then_swept() {
    let (db, _dir) = open_db();
    let coordinator = RetrievalCoordinator::new(db.clone());
    let sweeper = ExpirationSweeper::new(db.clone(), StdDuration::from_secs(60));

    let paste = db
        .pastes
        .create(
            "five seconds".to_string(),
            "plain".to_string(),
            ExpiryMode::AfterDuration { seconds: 5 },
        )
        .expect("create");
    let t = paste.created_at;

    assert_eq!(sweeper.sweep_once(t + Duration::seconds(4)), SweepReport::default());
    assert!(coordinator.fetch_at(&paste.id, t + Duration::seconds(4)).is_ok());

    assert!(matches!(
        coordinator.fetch_at(&paste.id, t + Duration::seconds(6)),
        Err(AppError::NotFound)
    ));
    assert_eq!(sweeper.sweep_once(t + Duration::seconds(6)).deleted, 1);
    assert!(db.pastes.get(&paste.id).expect("get").is_none());
}

#[tokio::test]
async fn hanging_highlighter_does_not_block_fetches() {
    let (db, _dir) = open_db();
    let service = service(db, StdDuration::from_millis(100));
    let id = service
        .create_paste("fn slow() {}".to_string(), "rust", ExpiryMode::Never)
        .await
        .expect("create");

    let view = tokio::time::timeout(StdDuration::from_secs(5), service.fetch_paste(&id))
        .await
        .expect("fetch must finish within the render timeout")
        .expect("fetch");
    assert_eq!(view.content, "fn slow() {}");
    assert!(!view.highlighted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn burn_after_read_survives_concurrent_service_fetches() {
    let (db, _dir) = open_db();
    let service = Arc::new(service(db, StdDuration::from_millis(100)));
    let id = service
        .create_paste("burn".to_string(), "plain", ExpiryMode::BurnAfterRead)
        .await
        .expect("create");

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let service = Arc::clone(&service);
            let id = id.clone();
            tokio::spawn(async move { service.fetch_raw_paste(&id).await })
        })
        .collect();

    let mut served = Vec::new();
    for task in tasks {
        match task.await.expect("task join") {
            Ok(content) => served.push(content),
            Err(AppError::NotFound) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    assert_eq!(served, vec!["burn".to_string()]);
    assert!(matches!(
        service.fetch_raw_paste(&id).await,
        Err(AppError::NotFound)
    ));
}
