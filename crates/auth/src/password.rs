//! One-way password hashing (Argon2id, PHC string format).

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash,
}

/// Salted one-way hasher.
///
/// Output is self-describing (algorithm, parameters and salt are embedded in
/// the PHC string), so verification needs no side-channel lookup. Plaintext
/// is never stored and never logged.
#[derive(Debug, Default, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// Repeated calls with the same input produce different encodings.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| PasswordError::Hash)?;
        Ok(hash.to_string())
    }

    /// Verify `plaintext` against a stored PHC string.
    ///
    /// Returns `false` for a mismatch *and* for any malformed hash; callers
    /// never need to distinguish the two. The comparison inside the argon2
    /// verifier is constant-time.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
