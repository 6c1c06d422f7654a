//! Database layer for Priggr.

/// Paste storage helpers.
pub mod paste;
/// redb table definitions.
pub mod tables;

use crate::error::AppError;
use crate::id::{IdIssuer, UuidIssuer};
use std::path::Path;
use std::sync::Arc;

pub use paste::{Consume, ConsumeCounters, ExpiredIds, PasteDb};

/// Database handle with access to the paste tables.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub pastes: PasteDb,
}

impl Database {
    /// Open (or create) the database under the directory `path`, issuing
    /// random UUID paste ids.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, redb cannot open
    /// the file, or the tables cannot be initialized.
    pub fn new(path: &str) -> Result<Self, AppError> {
        Self::with_issuer(path, Arc::new(UuidIssuer))
    }

    /// Open the database with a caller-supplied id issuer.
    ///
    /// # Errors
    /// Same as [`Database::new`].
    pub fn with_issuer(path: &str, issuer: Arc<dyn IdIssuer>) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                path, err
            ))
        })?;

        let file = dir.join(tables::REDB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "Database at '{}' is already open.\n\
                    Another Priggr instance may be running; stop it first, \
                    or set DB_PATH to use a different database location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };
        tracing::debug!("Opened paste database at {}", file.display());

        Self::from_shared(db, issuer)
    }

    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if the tables cannot be initialized.
    pub fn from_shared(db: Arc<redb::Database>, issuer: Arc<dyn IdIssuer>) -> Result<Self, AppError> {
        Ok(Self {
            pastes: PasteDb::new(db.clone(), issuer)?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process without
    /// reopening the file.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone(), self.pastes.issuer())
    }
}

#[cfg(test)]
mod tests;
