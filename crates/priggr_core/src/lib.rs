//! Core domain library for Priggr (config, storage, paste lifecycle).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across Priggr crates.
pub mod constants;
/// Database access layer and transactions.
pub mod db;
/// Environment helpers shared by config and tests.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Syntax highlighting through an external renderer.
pub mod highlight;
/// Paste id issuance.
pub mod id;
/// Data models for API requests and persistence.
pub mod models;
/// Atomic fetch with burn-after-read and TTL enforcement.
pub mod retrieval;
/// Create/fetch entry points for front ends.
pub mod service;
/// Background removal of expired pastes.
pub mod sweeper;

pub use config::Config;
pub use constants::{DEFAULT_MAX_PASTE_SIZE, DEFAULT_PORT};
pub use db::Database;
pub use error::AppError;
pub use highlight::{HighlightAdapter, Highlighter, PygmentsHighlighter, SupportedTags};
pub use models::paste::{ExpiryMode, PasteView};
pub use retrieval::RetrievalCoordinator;
pub use service::PasteService;
pub use sweeper::{ExpirationSweeper, SweepReport, SweeperHandle};
