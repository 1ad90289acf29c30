// Vaultline — Store error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Database handle poisoned by a panicked worker")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Map a failed write to `Conflict` when it violated a UNIQUE constraint.
    pub(crate) fn from_write(err: rusqlite::Error, what: impl Into<String>) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::Conflict(what.into())
            }
            other => Self::Database(other),
        }
    }
}
