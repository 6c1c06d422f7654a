//! Application error types for core storage and paste lifecycle logic.
use thiserror::Error;

/// Top-level application error type.
///
/// Absent, expired, and already-burned pastes all surface as [`AppError::NotFound`]
/// so callers cannot tell whether a paste ever existed.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Paste id '{0}' already exists")]
    IdCollision(String),

    #[error("Could not issue a unique paste id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },

    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Whether this error belongs to the storage class (backend or id issuance).
    pub fn is_storage(&self) -> bool {
        !matches!(self, Self::NotFound | Self::Validation(_))
    }
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::Database(value.into())
    }
}
