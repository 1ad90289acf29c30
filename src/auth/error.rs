// Vaultline — Auth error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("Invalid hash parameters: {0}")]
    Params(String),

    #[error("Hashing failed: {0}")]
    Hash(String),

    #[error("Stored verifier is malformed: {0}")]
    Malformed(String),
}
