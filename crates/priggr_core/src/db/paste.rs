//! Paste storage operations backed by redb.
//!
//! Every mutation runs inside a single redb write transaction. redb admits one
//! writer at a time, so two concurrent [`PasteDb::apply_consume`] calls on the
//! same id can never both observe the same pre-state.

use crate::constants::{EXPIRY_SCAN_BATCH, ID_ISSUE_ATTEMPTS};
use crate::db::tables::{PASTES, PASTES_BY_EXPIRY};
use crate::error::AppError;
use crate::id::IdIssuer;
use crate::models::paste::{ExpiryMode, Paste};
use chrono::{DateTime, SubsecRound, Utc};
use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata};
use std::collections::VecDeque;
use std::ops::Bound;
use std::sync::Arc;

/// Outcome of a consume transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consume {
    /// Persist the updated counters.
    Update,
    /// Remove the record (and its deadline index row) in the same transaction.
    Delete,
    /// Leave the record untouched and report [`AppError::NotFound`].
    Reject,
}

/// The only paste fields a consume transition may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeCounters {
    pub hit_count: u64,
    pub remaining_reads: Option<u32>,
}

/// Accessor for paste-related redb tables.
pub struct PasteDb {
    db: Arc<redb::Database>,
    issuer: Arc<dyn IdIssuer>,
}

impl PasteDb {
    /// Initialize paste tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>, issuer: Arc<dyn IdIssuer>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PASTES)?;
        write_txn.open_table(PASTES_BY_EXPIRY)?;
        write_txn.commit()?;
        Ok(Self { db, issuer })
    }

    pub(crate) fn issuer(&self) -> Arc<dyn IdIssuer> {
        Arc::clone(&self.issuer)
    }

    /// Create a paste under a freshly issued id.
    ///
    /// Candidate ids that collide with an existing row are discarded and a new
    /// one is drawn, up to [`ID_ISSUE_ATTEMPTS`] times.
    ///
    /// # Returns
    /// The committed record.
    ///
    /// # Errors
    /// - [`AppError::Validation`] for empty content or an unusable expiry, before
    ///   any write is attempted.
    /// - [`AppError::IdSpaceExhausted`] when every candidate collided.
    /// - Storage and serialization errors from the insert transaction.
    pub fn create(
        &self,
        content: String,
        syntax_tag: String,
        expiry: ExpiryMode,
    ) -> Result<Paste, AppError> {
        if content.is_empty() {
            return Err(AppError::Validation("Paste content is empty".to_string()));
        }
        // Whole milliseconds, so the deadline matches its index key exactly.
        let created_at = Utc::now().trunc_subsecs(3);
        expiry.validate(created_at)?;

        let mut paste = Paste::new(String::new(), content, syntax_tag, expiry, created_at);
        for attempt in 1..=ID_ISSUE_ATTEMPTS {
            paste.id = self.issuer.issue();
            match self.insert(&paste) {
                Ok(()) => return Ok(paste),
                Err(AppError::IdCollision(id)) => {
                    tracing::warn!(
                        "Paste id collision on '{}' (attempt {}/{})",
                        id,
                        attempt,
                        ID_ISSUE_ATTEMPTS
                    );
                }
                Err(err) => return Err(err),
            }
        }

        tracing::error!(
            "Failed to issue a unique paste id after {} attempts",
            ID_ISSUE_ATTEMPTS
        );
        Err(AppError::IdSpaceExhausted {
            attempts: ID_ISSUE_ATTEMPTS,
        })
    }

    fn insert(&self, paste: &Paste) -> Result<(), AppError> {
        let encoded = bincode::serialize(paste)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut by_expiry = write_txn.open_table(PASTES_BY_EXPIRY)?;

            if pastes.get(paste.id.as_str())?.is_some() {
                return Err(AppError::IdCollision(paste.id.clone()));
            }

            pastes.insert(paste.id.as_str(), encoded.as_slice())?;
            if let Some(deadline) = paste.expire_at {
                by_expiry.insert((expiry_key(deadline), paste.id.as_str()), ())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a paste by id without side effects.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<Paste>, AppError> {
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        match pastes.get(id)? {
            Some(value) => Ok(Some(deserialize_paste(value.value())?)),
            None => Ok(None),
        }
    }

    /// Read a record, run `transition` on it, and commit the result, all in
    /// one write transaction.
    ///
    /// `transition` sees the full record but may only change its counters.
    ///
    /// # Returns
    /// The record as left by the transition. For [`Consume::Delete`] this is
    /// the final state of the now-deleted record.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when the id is absent or the transition
    /// rejects, plus any storage or serialization error.
    pub fn apply_consume<F>(&self, id: &str, transition: F) -> Result<Paste, AppError>
    where
        F: FnOnce(&Paste, &mut ConsumeCounters) -> Consume,
    {
        let write_txn = self.db.begin_write()?;
        let committed = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut by_expiry = write_txn.open_table(PASTES_BY_EXPIRY)?;

            let Some(guard) = pastes.get(id)? else {
                return Err(AppError::NotFound);
            };
            let mut paste = deserialize_paste(guard.value())?;
            drop(guard);

            let mut counters = ConsumeCounters {
                hit_count: paste.hit_count,
                remaining_reads: paste.remaining_reads,
            };
            let decision = transition(&paste, &mut counters);
            paste.hit_count = counters.hit_count;
            paste.remaining_reads = counters.remaining_reads;

            match decision {
                Consume::Update => {
                    let encoded = bincode::serialize(&paste)?;
                    pastes.insert(id, encoded.as_slice())?;
                    Some(paste)
                }
                Consume::Delete => {
                    pastes.remove(id)?;
                    if let Some(deadline) = paste.expire_at {
                        by_expiry.remove((expiry_key(deadline), id))?;
                    }
                    Some(paste)
                }
                Consume::Reject => None,
            }
        };

        match committed {
            Some(paste) => {
                write_txn.commit()?;
                Ok(paste)
            }
            None => {
                write_txn.abort()?;
                Err(AppError::NotFound)
            }
        }
    }

    /// Delete a paste by id. Deleting a missing id is not an error.
    ///
    /// # Returns
    /// `true` when a row was deleted, otherwise `false`.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut by_expiry = write_txn.open_table(PASTES_BY_EXPIRY)?;

            let Some(guard) = pastes.get(id)? else {
                return Ok(false);
            };
            let paste = deserialize_paste(guard.value())?;
            drop(guard);

            pastes.remove(id)?;
            if let Some(deadline) = paste.expire_at {
                by_expiry.remove((expiry_key(deadline), id))?;
            }
            true
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    /// Lazily list ids whose deadline is set and `<= now`.
    ///
    /// The sequence is finite and one-shot; see [`ExpiredIds`].
    pub fn list_expired(&self, now: DateTime<Utc>) -> ExpiredIds {
        ExpiredIds::new(Arc::clone(&self.db), now, EXPIRY_SCAN_BATCH)
    }

    /// Number of stored pastes.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn len(&self) -> Result<u64, AppError> {
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        Ok(pastes.len()?)
    }

    /// Whether the store holds no pastes.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.len()? == 0)
    }
}

/// Ids of pastes past their deadline, read from the expiry index in batches.
///
/// Each batch runs in its own short read transaction and resumes after the
/// last key yielded, so rows deleted between batches are never revisited.
/// The walk stops at the first error.
pub struct ExpiredIds {
    db: Arc<redb::Database>,
    upper: u64,
    batch: usize,
    cursor: Option<(u64, String)>,
    buffer: VecDeque<(u64, String)>,
    exhausted: bool,
}

impl ExpiredIds {
    fn new(db: Arc<redb::Database>, now: DateTime<Utc>, batch: usize) -> Self {
        Self {
            db,
            upper: bound_key(now).saturating_add(1),
            batch: batch.max(1),
            cursor: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fill(&mut self) -> Result<(), AppError> {
        let read_txn = self.db.begin_read()?;
        let by_expiry = read_txn.open_table(PASTES_BY_EXPIRY)?;

        let lower = match &self.cursor {
            Some((millis, id)) => Bound::Excluded((*millis, id.as_str())),
            None => Bound::Unbounded,
        };
        let upper = Bound::Excluded((self.upper, ""));

        for item in by_expiry.range((lower, upper))?.take(self.batch) {
            let (key, _) = item?;
            let (millis, id) = key.value();
            self.buffer.push_back((millis, id.to_string()));
        }
        if self.buffer.len() < self.batch {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl Iterator for ExpiredIds {
    type Item = Result<String, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((millis, id)) = self.buffer.pop_front() {
                self.cursor = Some((millis, id.clone()));
                return Some(Ok(id));
            }
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fill() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
    }
}

/// Index key for a deadline, rounded up to the next whole millisecond so a
/// sweep bound can never sort past a deadline it has not reached.
fn expiry_key(deadline: DateTime<Utc>) -> u64 {
    let partial = deadline.timestamp_subsec_nanos() % 1_000_000 != 0;
    bound_key(deadline).saturating_add(u64::from(partial))
}

/// Index key for a sweep's `now`, rounded down.
fn bound_key(now: DateTime<Utc>) -> u64 {
    // Pre-epoch instants clamp to zero rather than wrapping.
    now.timestamp_millis().max(0) as u64
}

fn deserialize_paste(bytes: &[u8]) -> Result<Paste, bincode::Error> {
    bincode::deserialize(bytes)
}
