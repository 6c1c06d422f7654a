//! HTTP request handlers.

/// Paste-related endpoints.
pub mod paste;
