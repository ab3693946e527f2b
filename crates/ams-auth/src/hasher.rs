//! # Credential Hasher
//!
//! One-way transformation of a plaintext secret into a stored digest.
//!
//! Digests are Argon2id PHC strings with a random per-hash salt, so two
//! hashes of the same secret differ. Authentication therefore never compares
//! digests directly — it goes through [`CredentialHasher::verify`], which
//! re-derives the key under the stored salt and compares in constant time
//! inside the `argon2` crate.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::HasherError;

/// Argon2id credential hasher with the crate-default parameters
/// (19 MiB memory, 2 iterations, 1 lane).
#[derive(Clone, Default)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Create a hasher with default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a plaintext secret into a PHC-format digest string.
    ///
    /// Salted per call: `hash(s) != hash(s)`. The stored digest embeds the
    /// algorithm, parameters, and salt, so verification needs nothing else.
    pub fn hash(&self, secret: &str) -> Result<String, HasherError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HasherError(e.to_string()))
    }

    /// Verify a plaintext secret against a stored digest.
    ///
    /// Constant-time comparison happens inside `verify_password`. A digest
    /// that cannot be parsed as a PHC string verifies as `false` rather than
    /// erroring — a corrupt stored digest must behave like a wrong password.
    pub fn verify(&self, secret: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}
