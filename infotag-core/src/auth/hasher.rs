//! Secret hashing and verification
//!
//! PINs are stored only as salted one-way digests. Verification is
//! constant-time-equivalent and fails closed on malformed digests.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::warn;

use crate::error::HasherError;

/// One-way hashing capability protecting the PIN at rest
///
/// Only the digest and the boolean verification outcome ever cross this
/// boundary; the plaintext never leaves the caller.
pub trait SecretHasher: Send + Sync {
    /// Produce a salted digest of the plaintext
    ///
    /// The salt is randomly generated per call and embedded in the digest
    /// representation, so verification needs only the digest.
    fn hash(&self, plaintext: &str) -> Result<String, HasherError>;

    /// Verify the plaintext against a stored digest
    ///
    /// Malformed digests verify to `false`; this never raises an error
    /// to the caller.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Production hasher producing Argon2id PHC strings
#[derive(Debug, Clone, Default)]
pub struct Argon2SecretHasher;

impl Argon2SecretHasher {
    /// Create a hasher with the default Argon2id parameters
    pub fn new() -> Self {
        Self
    }
}

impl SecretHasher for Argon2SecretHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HasherError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HasherError::HashFailed {
                message: e.to_string(),
            })?;
        Ok(digest.to_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(_) => {
                // Fail closed on digests that do not parse
                warn!("stored digest is not a valid PHC string");
                return false;
            }
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
