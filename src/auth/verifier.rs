// Vaultline — Secret Verifiers
//
// Master passwords and security answers are stored only as verifiers.
// The shipped implementation produces Argon2id PHC strings with a fresh
// random salt per call, so two verifiers of the same secret differ; matching
// is done by `verify`, which re-derives with the salt and cost embedded in
// the stored string.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

use super::VerifierError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Salt length in bytes before base64 encoding.
const SALT_LEN: usize = 16;

// Argon2id defaults for interactive logins: m=19456 (19 MiB), t=2, p=1.
const ARGON2_M_COST: u32 = 19456;
const ARGON2_T_COST: u32 = 2;
const ARGON2_P_COST: u32 = 1;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Maps a secret to a storable verifier and checks secrets against one.
pub trait SecretVerifier: Send + Sync {
    /// Derive a verifier for `secret`.
    fn derive(&self, secret: &str) -> Result<String, VerifierError>;

    /// Check whether `secret` matches a previously derived `verifier`.
    fn verify(&self, secret: &str, verifier: &str) -> Result<bool, VerifierError>;
}

// ─── Argon2id Implementation ─────────────────────────────────────────────────

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: ARGON2_M_COST,
            iterations: ARGON2_T_COST,
            parallelism: ARGON2_P_COST,
        }
    }
}

pub struct Argon2Verifier {
    params: Params,
}

impl Argon2Verifier {
    pub fn new(cost: HashCost) -> Result<Self, VerifierError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| VerifierError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn generate_salt() -> Result<SaltString, VerifierError> {
        let mut bytes = Zeroizing::new([0u8; SALT_LEN]);
        rand::rng().fill_bytes(&mut bytes[..]);
        SaltString::encode_b64(&bytes[..]).map_err(|e| VerifierError::Hash(e.to_string()))
    }
}

impl Default for Argon2Verifier {
    fn default() -> Self {
        Self {
            params: Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)
                .unwrap_or_default(),
        }
    }
}

impl SecretVerifier for Argon2Verifier {
    fn derive(&self, secret: &str) -> Result<String, VerifierError> {
        let salt = Self::generate_salt()?;
        let hash = self
            .hasher()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| VerifierError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, secret: &str, verifier: &str) -> Result<bool, VerifierError> {
        let parsed =
            PasswordHash::new(verifier).map_err(|e| VerifierError::Malformed(e.to_string()))?;

        match self.hasher().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(VerifierError::Hash(e.to_string())),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal cost so the suite stays fast.
    fn cheap() -> Argon2Verifier {
        Argon2Verifier::new(HashCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_verifier_never_contains_the_secret() {
        let v = cheap().derive("Str0ng!Pw").unwrap();
        assert!(!v.contains("Str0ng!Pw"));
        assert!(v.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_matching_secret() {
        let verifier = cheap();
        let stored = verifier.derive("Str0ng!Pw").unwrap();
        assert!(verifier.verify("Str0ng!Pw", &stored).unwrap());
    }

    #[test]
    fn test_verify_wrong_secret() {
        let verifier = cheap();
        let stored = verifier.derive("Str0ng!Pw").unwrap();
        assert!(!verifier.verify("str0ng!pw", &stored).unwrap());
    }

    #[test]
    fn test_derive_is_salted() {
        let verifier = cheap();
        let a = verifier.derive("password").unwrap();
        let b = verifier.derive("password").unwrap();
        assert_ne!(a, b, "each verifier must carry its own salt");
        assert!(verifier.verify("password", &a).unwrap());
        assert!(verifier.verify("password", &b).unwrap());
    }

    #[test]
    fn test_verify_uses_cost_from_stored_string() {
        let stored = cheap().derive("Abcdef1!").unwrap();
        let other = Argon2Verifier::new(HashCost {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.verify("Abcdef1!", &stored).unwrap());
    }

    #[test]
    fn test_malformed_verifier_is_an_error() {
        let result = cheap().verify("secret", "1234567890");
        assert!(matches!(result, Err(VerifierError::Malformed(_))));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = Argon2Verifier::new(HashCost {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(VerifierError::Params(_))));
    }
}
