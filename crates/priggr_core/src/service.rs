//! Paste operations exposed to the presentation layer.

use crate::db::Database;
use crate::error::AppError;
use crate::highlight::{HighlightAdapter, SupportedTags};
use crate::models::paste::{ExpiryMode, Paste, PasteView};
use crate::retrieval::RetrievalCoordinator;
use std::sync::Arc;

/// Create/fetch entry points shared by every front end.
///
/// Store calls block, so each one runs on the tokio blocking pool.
#[derive(Clone)]
pub struct PasteService {
    db: Arc<Database>,
    coordinator: RetrievalCoordinator,
    adapter: HighlightAdapter,
    max_paste_size: usize,
}

impl PasteService {
    pub fn new(db: Arc<Database>, adapter: HighlightAdapter, max_paste_size: usize) -> Self {
        Self {
            coordinator: RetrievalCoordinator::new(db.clone()),
            db,
            adapter,
            max_paste_size,
        }
    }

    /// Store a new paste and return its id.
    ///
    /// `syntax_tag` is coerced against the supported set before storing, so
    /// the stored tag is always one the highlighter can render.
    ///
    /// # Errors
    /// [`AppError::Validation`] for empty or oversized content or a bad expiry;
    /// storage errors otherwise.
    pub async fn create_paste(
        &self,
        content: String,
        syntax_tag: &str,
        expiry: ExpiryMode,
    ) -> Result<String, AppError> {
        if content.len() > self.max_paste_size {
            return Err(AppError::Validation(format!(
                "Paste size exceeds maximum of {} bytes",
                self.max_paste_size
            )));
        }
        let syntax_tag = self.adapter.coerce_tag(syntax_tag);

        let db = self.db.clone();
        let paste = blocking(move || db.pastes.create(content, syntax_tag, expiry)).await?;
        tracing::info!(
            "Created paste {} ({}, {} bytes, {:?})",
            paste.id,
            paste.syntax_tag,
            paste.content.len(),
            paste.expiry
        );
        Ok(paste.id)
    }

    /// Consume a read and return the paste rendered through the highlighter.
    ///
    /// # Errors
    /// [`AppError::NotFound`] for absent, expired, or burned pastes; storage
    /// errors otherwise. Highlighter failures never surface here.
    pub async fn fetch_paste(&self, id: &str) -> Result<PasteView, AppError> {
        let paste = self.consume(id).await?;
        let rendered = self.adapter.render(&paste.content, &paste.syntax_tag).await;
        Ok(PasteView {
            content: rendered.body,
            syntax_tag: paste.syntax_tag,
            created_at: paste.created_at,
            highlighted: rendered.highlighted,
        })
    }

    /// Consume a read and return the stored content unmodified.
    ///
    /// # Errors
    /// Same as [`PasteService::fetch_paste`].
    pub async fn fetch_raw_paste(&self, id: &str) -> Result<String, AppError> {
        Ok(self.consume(id).await?.content)
    }

    pub fn supported_tags(&self) -> &SupportedTags {
        self.adapter.tags()
    }

    async fn consume(&self, id: &str) -> Result<Paste, AppError> {
        let coordinator = self.coordinator.clone();
        let id = id.to_string();
        blocking(move || coordinator.fetch(&id)).await
    }
}

async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| AppError::StorageMessage(format!("Storage task failed: {}", err)))?
}
