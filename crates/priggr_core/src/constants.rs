//! Shared constants used across Priggr crates.

/// Default HTTP port for Priggr.
pub const DEFAULT_PORT: u16 = 8998;

/// Default maximum paste size accepted at creation time.
pub const DEFAULT_MAX_PASTE_SIZE: usize = 10 * 1024 * 1024;

/// Default period between expiration sweeps, in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Default upper bound for a single highlighter render, in milliseconds.
pub const DEFAULT_HIGHLIGHT_TIMEOUT_MS: u64 = 2_000;

/// Default highlighter executable, resolved through `PATH`.
pub const DEFAULT_PYGMENTIZE: &str = "pygmentize";

/// Candidate ids drawn per creation before giving up with a storage error.
pub const ID_ISSUE_ATTEMPTS: usize = 5;

/// Ids read from the expiry index per read transaction during a sweep.
pub const EXPIRY_SCAN_BATCH: usize = 256;

/// Wire value of `expires` that selects burn-after-read.
pub const BURN_AFTER_READ_WIRE: i64 = -2;
