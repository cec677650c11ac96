//! Port for password hashing at the identity edge.
//!
//! The scheme itself (argon2 parameters and so on) is an adapter concern;
//! the domain only needs hash and verify.

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hasher adapters.
    pub enum CredentialHasherError {
        /// Hashing or verification failed internally.
        Hash { message: String } =>
            "credential hashing failed: {message}",
    }
}

/// Port for one-way password hashing and verification.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing PHC string.
    fn hash(&self, password: &str) -> Result<String, CredentialHasherError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, stored_hash: &str)
    -> Result<bool, CredentialHasherError>;
}

/// Fixture hasher for tests: "hashes" by prefixing, verifies by equality.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

impl CredentialHasher for FixtureCredentialHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHasherError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, CredentialHasherError> {
        Ok(stored_hash == format!("plain:{password}"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[test]
    fn fixture_round_trips() {
        let hasher = FixtureCredentialHasher;
        let hash = hasher.hash("secret").expect("fixture hash succeeds");
        assert!(hasher.verify("secret", &hash).expect("verify succeeds"));
        assert!(!hasher.verify("wrong", &hash).expect("verify succeeds"));
    }
}
