//! Syntax highlighting through an external renderer.
//!
//! Rendering is presentation only: any failure or timeout falls back to the
//! stored content, so a broken highlighter never fails a fetch.

mod pygments;

pub use pygments::PygmentsHighlighter;

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a [`Highlighter`] backend.
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Failed to start highlighter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Highlighter I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Highlighter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Highlighter produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// External syntax renderer.
#[async_trait]
pub trait Highlighter: Send + Sync {
    /// Canonical names of every syntax the renderer understands.
    async fn list_supported_tags(&self) -> Result<BTreeSet<String>, HighlightError>;

    /// Render `content` as markup for the given (already coerced) tag.
    async fn render(&self, content: &str, tag: &str) -> Result<String, HighlightError>;
}

/// The syntax names accepted at creation, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedTags {
    tags: BTreeSet<String>,
}

impl SupportedTags {
    /// Let the renderer guess the syntax.
    pub const AUTODETECT: &'static str = "autodetect";
    /// No highlighting.
    pub const PLAIN: &'static str = "plain";

    pub fn new(tags: BTreeSet<String>) -> Self {
        Self { tags }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Map a requested tag onto one the renderer will accept.
    ///
    /// Unknown and empty tags become [`SupportedTags::PLAIN`].
    pub fn coerce(&self, requested: &str) -> String {
        let tag = requested.trim();
        if tag == Self::AUTODETECT || tag == Self::PLAIN || self.contains(tag) {
            tag.to_string()
        } else {
            Self::PLAIN.to_string()
        }
    }

    /// Sentinels first, then every known tag in sorted order.
    pub fn choices(&self) -> Vec<String> {
        [Self::AUTODETECT, Self::PLAIN]
            .into_iter()
            .map(str::to_string)
            .chain(
                self.tags
                    .iter()
                    .filter(|tag| tag.as_str() != Self::AUTODETECT && tag.as_str() != Self::PLAIN)
                    .cloned(),
            )
            .collect()
    }
}

/// Output of [`HighlightAdapter::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    /// `false` when `body` is the unmodified content.
    pub highlighted: bool,
}

impl Rendered {
    fn degraded(content: &str) -> Self {
        Self {
            body: content.to_string(),
            highlighted: false,
        }
    }
}

/// Wraps a [`Highlighter`] with a timeout and plain-text fallback.
#[derive(Clone)]
pub struct HighlightAdapter {
    highlighter: Arc<dyn Highlighter>,
    tags: Arc<SupportedTags>,
    timeout: Duration,
}

impl HighlightAdapter {
    pub fn new(highlighter: Arc<dyn Highlighter>, tags: Arc<SupportedTags>, timeout: Duration) -> Self {
        Self {
            highlighter,
            tags,
            timeout,
        }
    }

    /// Query the renderer's tags once and build an adapter around them.
    ///
    /// If the query fails the adapter starts with no tags, every paste is
    /// stored as plain, and rendering is skipped.
    pub async fn bootstrap(highlighter: Arc<dyn Highlighter>, timeout: Duration) -> Self {
        let tags = match tokio::time::timeout(timeout, highlighter.list_supported_tags()).await {
            Ok(Ok(tags)) => {
                tracing::info!("Highlighter ready with {} syntaxes", tags.len());
                SupportedTags::new(tags)
            }
            Ok(Err(err)) => {
                tracing::warn!("Highlighter unavailable, serving plain text: {}", err);
                SupportedTags::default()
            }
            Err(_) => {
                tracing::warn!(
                    "Highlighter did not list syntaxes within {:?}, serving plain text",
                    timeout
                );
                SupportedTags::default()
            }
        };
        Self::new(highlighter, Arc::new(tags), timeout)
    }

    pub fn tags(&self) -> &SupportedTags {
        &self.tags
    }

    pub fn coerce_tag(&self, requested: &str) -> String {
        self.tags.coerce(requested)
    }

    /// Render `content`, falling back to the content itself on any failure.
    pub async fn render(&self, content: &str, tag: &str) -> Rendered {
        if self.tags.is_empty() {
            return Rendered::degraded(content);
        }
        match tokio::time::timeout(self.timeout, self.highlighter.render(content, tag)).await {
            Ok(Ok(body)) => Rendered {
                body,
                highlighted: true,
            },
            Ok(Err(err)) => {
                tracing::warn!("Highlighting as '{}' failed: {}", tag, err);
                Rendered::degraded(content)
            }
            Err(_) => {
                tracing::warn!(
                    "Highlighting as '{}' timed out after {:?}",
                    tag,
                    self.timeout
                );
                Rendered::degraded(content)
            }
        }
    }
}
