//! Argon2id credential hasher adapter.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// Credential hasher backed by Argon2id with the crate's default parameters.
#[derive(Default, Clone)]
pub struct Argon2CredentialHasher {
    inner: Argon2<'static>,
}

impl Argon2CredentialHasher {
    /// Create a hasher with the default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        self.inner
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialHasherError::hash(err.to_string()))
    }

    fn verify(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, CredentialHasherError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|err| CredentialHasherError::hash(err.to_string()))?;
        Ok(self
            .inner
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
