//! Atomic get-and-consume on top of the paste store.

use crate::db::{Consume, ConsumeCounters, Database};
use crate::error::AppError;
use crate::models::paste::{ExpiryMode, Paste};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Applies each paste's consume policy as a single store transition.
///
/// Absent, expired, and already-burned pastes are all reported as
/// [`AppError::NotFound`].
#[derive(Clone)]
pub struct RetrievalCoordinator {
    db: Arc<Database>,
}

impl RetrievalCoordinator {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Fetch a paste, counting the hit and burning it if it is read-once.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for absent, expired, or consumed pastes,
    /// and storage errors as-is.
    pub fn fetch(&self, id: &str) -> Result<Paste, AppError> {
        self.fetch_at(id, Utc::now())
    }

    /// [`RetrievalCoordinator::fetch`] evaluated against an explicit clock.
    ///
    /// # Errors
    /// Same as [`RetrievalCoordinator::fetch`].
    pub fn fetch_at(&self, id: &str, now: DateTime<Utc>) -> Result<Paste, AppError> {
        let paste = self
            .db
            .pastes
            .apply_consume(id, |paste, counters| consume_transition(paste, counters, now))?;
        tracing::debug!(
            "Served paste {} (hits: {}, burned: {})",
            paste.id,
            paste.hit_count,
            paste.remaining_reads == Some(0)
        );
        Ok(paste)
    }
}

pub(crate) fn consume_transition(
    paste: &Paste,
    counters: &mut ConsumeCounters,
    now: DateTime<Utc>,
) -> Consume {
    match paste.expiry {
        ExpiryMode::BurnAfterRead => match counters.remaining_reads {
            Some(remaining) if remaining > 0 => {
                let remaining = remaining - 1;
                counters.remaining_reads = Some(remaining);
                counters.hit_count = counters.hit_count.saturating_add(1);
                if remaining == 0 {
                    Consume::Delete
                } else {
                    Consume::Update
                }
            }
            _ => Consume::Reject,
        },
        ExpiryMode::AfterDuration { .. } if paste.is_expired_at(now) => Consume::Reject,
        ExpiryMode::AfterDuration { .. } | ExpiryMode::Never => {
            counters.hit_count = counters.hit_count.saturating_add(1);
            Consume::Update
        }
    }
}
