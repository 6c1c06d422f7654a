//! Shared integration-test server bootstrap helpers.

use async_trait::async_trait;
use axum_test::TestServer;
use priggr_core::highlight::{HighlightError, Highlighter, SupportedTags};
use priggr_server::{create_app, AppState, Config, Database, HighlightAdapter, PasteService};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Wraps content in a marker so tests can tell rendered output apart.
pub(crate) struct MarkerHighlighter;

#[async_trait]
impl Highlighter for MarkerHighlighter {
    async fn list_supported_tags(&self) -> Result<BTreeSet<String>, HighlightError> {
        Ok(["python", "rust"].iter().map(|tag| tag.to_string()).collect())
    }

    async fn render(&self, content: &str, tag: &str) -> Result<String, HighlightError> {
        Ok(format!("<div class=\"{}\">{}</div>", tag, content))
    }
}

/// Always fails, as a missing or crashing renderer would.
pub(crate) struct BrokenHighlighter;

#[async_trait]
impl Highlighter for BrokenHighlighter {
    async fn list_supported_tags(&self) -> Result<BTreeSet<String>, HighlightError> {
        Ok(["rust".to_string()].into_iter().collect())
    }

    async fn render(&self, _content: &str, _tag: &str) -> Result<String, HighlightError> {
        Err(HighlightError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "boom".to_string(),
        })
    }
}

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config {
        port: 0,
        db_path: db_path.to_str().expect("db path").to_string(),
        max_paste_size: 64 * 1024,
        sweep_interval_secs: 60,
        highlight_timeout_ms: 500,
        pygmentize: "pygmentize".to_string(),
    }
}

pub(crate) fn test_server_with(highlighter: Arc<dyn Highlighter>) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_db_path(&temp_dir.path().join("db"));
    let db = Arc::new(Database::new(&config.db_path).expect("open db"));
    let tags = Arc::new(SupportedTags::new(
        ["python", "rust"].iter().map(|tag| tag.to_string()).collect(),
    ));
    let adapter = HighlightAdapter::new(highlighter, tags, config.highlight_timeout());
    let service = PasteService::new(db, adapter, config.max_paste_size);
    let app = create_app(AppState::new(config, service), false);
    let server = TestServer::new(app).expect("server");
    (server, temp_dir)
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    test_server_with(Arc::new(MarkerHighlighter))
}
