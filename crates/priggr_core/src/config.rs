//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_HIGHLIGHT_TIMEOUT_MS, DEFAULT_MAX_PASTE_SIZE, DEFAULT_PORT, DEFAULT_PYGMENTIZE,
    DEFAULT_SWEEP_INTERVAL_SECS,
};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration for Priggr.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_paste_size: usize,
    pub sweep_interval_secs: u64,
    pub highlight_timeout_ms: u64,
    pub pygmentize: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            port: DEFAULT_PORT,
            max_paste_size: DEFAULT_MAX_PASTE_SIZE,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            highlight_timeout_ms: DEFAULT_HIGHLIGHT_TIMEOUT_MS,
            pygmentize: DEFAULT_PYGMENTIZE.to_string(),
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_db_path() -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("priggr")
        .join("db")
        .to_string_lossy()
        .to_string()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parse_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring unparsable {}='{}'; using default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparsable. A zero sweep interval or highlight timeout falls back to
    /// the default, since neither can drive a timer.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let sweep_interval_secs = match env_parse_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval_secs) {
            0 => defaults.sweep_interval_secs,
            secs => secs,
        };
        let highlight_timeout_ms =
            match env_parse_or("HIGHLIGHT_TIMEOUT_MS", defaults.highlight_timeout_ms) {
                0 => defaults.highlight_timeout_ms,
                ms => ms,
            };
        Self {
            db_path: env::var("DB_PATH")
                .map(expand_tilde)
                .unwrap_or(defaults.db_path),
            port: env_parse_or("PORT", defaults.port),
            max_paste_size: env_parse_or("MAX_PASTE_SIZE", defaults.max_paste_size),
            sweep_interval_secs,
            highlight_timeout_ms,
            pygmentize: env::var("PYGMENTIZE")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .unwrap_or(defaults.pygmentize),
        }
    }

    /// Period between expiration sweeps.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Upper bound for a single highlighter render.
    pub fn highlight_timeout(&self) -> Duration {
        Duration::from_millis(self.highlight_timeout_ms)
    }
}
