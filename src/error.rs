// Vaultline — Top-level error types
//
// Aggregates errors from the store, auth and configuration layers into a
// single enum for the process boundary.

use thiserror::Error;

/// Top-level error type for all Vaultline operations.
#[derive(Debug, Error)]
pub enum VaultlineError {
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Verifier error: {0}")]
    Verifier(#[from] crate::auth::VerifierError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VaultlineError>;
