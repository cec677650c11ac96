//! Port for identity store persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{User, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The username is already registered.
        DuplicateUsername =>
            "an account with this username already exists",
        /// The email address is already registered.
        DuplicateEmail =>
            "an account with this email already exists",
    }
}

/// A user together with the password hash stored for it.
///
/// Only the login path sees this type; everything else works with [`User`].
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// The account the credentials belong to.
    pub user: User,
    /// Hashed password in PHC string format.
    pub password_hash: String,
}

/// Port for account storage and credential reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account with its password hash.
    ///
    /// Adapters map unique-constraint violations to
    /// [`UserRepositoryError::DuplicateUsername`] /
    /// [`UserRepositoryError::DuplicateEmail`].
    async fn create(&self, user: &User, password_hash: &str) -> Result<(), UserRepositoryError>;

    /// Find an account by id.
    async fn find_by_id(&self, user_id: &Uuid) -> Result<Option<User>, UserRepositoryError>;

    /// Find an account by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Load an account together with its stored password hash.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;
}

/// Fixture implementation for tests that do not exercise identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, _user: &User, _password_hash: &str) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _user_id: &Uuid) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_username(
        &self,
        _username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_credentials(
        &self,
        _username: &Username,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        Ok(None)
    }
}
