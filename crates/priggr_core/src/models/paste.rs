//! Paste record, expiry policy, and the request/response shapes built on them.

use crate::constants::BURN_AFTER_READ_WIRE;
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How a paste leaves the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryMode {
    /// Kept until explicitly deleted.
    Never,
    /// Hidden and swept once `seconds` have elapsed since creation.
    AfterDuration { seconds: u64 },
    /// Deleted by the first successful fetch.
    BurnAfterRead,
}

impl ExpiryMode {
    /// Decode the integer `expires` field used by the HTTP surface.
    ///
    /// `0` keeps the paste forever, positive values are a TTL in seconds, and
    /// `-2` selects burn-after-read.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for any other negative value.
    pub fn from_wire_seconds(expires: i64) -> Result<Self, AppError> {
        match expires {
            0 => Ok(Self::Never),
            BURN_AFTER_READ_WIRE => Ok(Self::BurnAfterRead),
            seconds if seconds > 0 => Ok(Self::AfterDuration {
                seconds: seconds as u64,
            }),
            other => Err(AppError::Validation(format!(
                "Unsupported expiry value {}; use 0, a positive number of seconds, or {}",
                other, BURN_AFTER_READ_WIRE
            ))),
        }
    }

    /// Reject policies that cannot produce a usable record when created at
    /// `created_at`.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a zero duration, or one whose
    /// deadline falls outside the representable date range.
    pub fn validate(&self, created_at: DateTime<Utc>) -> Result<(), AppError> {
        match self {
            Self::AfterDuration { seconds: 0 } => Err(AppError::Validation(
                "Expiry duration must be at least one second".to_string(),
            )),
            Self::AfterDuration { seconds } if self.deadline_from(created_at).is_none() => Err(
                AppError::Validation(format!("Expiry duration {} is too large", seconds)),
            ),
            _ => Ok(()),
        }
    }

    /// Absolute deadline for a paste created at `created_at`, if any.
    pub fn deadline_from(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::AfterDuration { seconds } => i64::try_from(*seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .and_then(|ttl| created_at.checked_add_signed(ttl)),
            Self::Never | Self::BurnAfterRead => None,
        }
    }

    /// Initial read budget; `None` means unlimited.
    pub fn initial_reads(&self) -> Option<u32> {
        match self {
            Self::BurnAfterRead => Some(1),
            Self::Never | Self::AfterDuration { .. } => None,
        }
    }
}

/// A stored paste. `content` and `syntax_tag` are never rewritten after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub syntax_tag: String,
    pub created_at: DateTime<Utc>,
    pub expiry: ExpiryMode,
    pub expire_at: Option<DateTime<Utc>>,
    pub remaining_reads: Option<u32>,
    pub hit_count: u64,
}

impl Paste {
    /// Build a fresh record with deadlines and counters derived from `expiry`.
    pub fn new(
        id: String,
        content: String,
        syntax_tag: String,
        expiry: ExpiryMode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content,
            syntax_tag,
            created_at,
            expire_at: expiry.deadline_from(created_at),
            remaining_reads: expiry.initial_reads(),
            expiry,
            hit_count: 0,
        }
    }

    /// Whether the time-based deadline has strictly passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expire_at, Some(deadline) if now > deadline)
    }

    pub fn is_burn_after_read(&self) -> bool {
        matches!(self.expiry, ExpiryMode::BurnAfterRead)
    }
}

/// Request payload for creating a paste.
#[derive(Debug, Deserialize)]
pub struct CreatePasteRequest {
    pub content: String,
    pub syntax: Option<String>,
    #[serde(default)]
    pub expires: i64,
}

/// Response payload for a created paste.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePasteResponse {
    pub id: String,
}

/// What the presentation layer receives from a successful fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasteView {
    pub content: String,
    pub syntax_tag: String,
    pub created_at: DateTime<Utc>,
    pub highlighted: bool,
}
