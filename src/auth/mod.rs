// Vaultline — Auth Module
//
// Password policy and secret verifiers. Verifiers are the only form in which
// master passwords and security answers ever reach the store; the Argon2id
// implementation can be swapped for any other `SecretVerifier`.

mod error;
mod policy;
mod verifier;

pub use error::VerifierError;
pub use policy::PasswordStrength;
pub use verifier::{Argon2Verifier, HashCost, SecretVerifier};
