//! Data models for persistence and the presentation boundary.

/// Paste records and expiry policy.
pub mod paste;
