//! Driving ports for registration, login, and profile reads.
//!
//! The exchange core trusts a resolved username; these ports are where that
//! username comes from. Login failures are deliberately uniform: a missing
//! account and a wrong password produce the same error, so the endpoint does
//! not leak which usernames exist.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Role, User, Username};

/// Serializable account payload for driving ports and adapters.
///
/// Never carries credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    /// Stable account identifier.
    pub id: Uuid,
    /// Unique account name.
    pub username: Username,
    /// Contact address.
    pub email: String,
    /// Moderation role.
    pub role: Role,
    /// Whether the account may act.
    pub enabled: bool,
}

impl From<User> for UserPayload {
    fn from(value: User) -> Self {
        Self {
            id: value.id(),
            username: value.username().clone(),
            email: value.email().as_ref().to_owned(),
            role: value.role(),
            enabled: value.is_enabled(),
        }
    }
}

/// Request to register a new account.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    /// Desired account name.
    pub username: Username,
    /// Contact address.
    pub email: String,
    /// Plaintext password, hashed before it reaches storage.
    pub password: String,
}

/// Response carrying the freshly registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponse {
    /// The created account.
    pub user: UserPayload,
}

/// Request to authenticate an account.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Account name.
    pub username: Username,
    /// Plaintext password to verify.
    pub password: String,
}

/// Response carrying the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// The authenticated account.
    pub user: UserPayload,
}

/// Request for an account profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    /// Account name to resolve.
    pub username: Username,
}

/// Response carrying an account profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    /// The resolved account.
    pub user: UserPayload,
}

/// Driving port for account registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityCommand: Send + Sync {
    /// Register a new account with a unique username and email.
    async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, Error>;
}

/// Driving port for credential verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and return the account on success.
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, Error>;
}

/// Driving port for profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityQuery: Send + Sync {
    /// Resolve an account by username.
    async fn profile(&self, request: ProfileRequest) -> Result<ProfileResponse, Error>;
}

/// Fixture login service for adapter tests; rejects every credential pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn login(&self, _request: LoginRequest) -> Result<LoginResponse, Error> {
        Err(Error::unauthorized("invalid username or password"))
    }
}

/// Fixture registration port for adapter tests; identity is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityCommand;

#[async_trait]
impl IdentityCommand for FixtureIdentityCommand {
    async fn register(&self, _request: RegisterRequest) -> Result<RegisterResponse, Error> {
        Err(Error::service_unavailable("identity store not configured"))
    }
}

/// Fixture profile port for adapter tests; knows no accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityQuery;

#[async_trait]
impl IdentityQuery for FixtureIdentityQuery {
    async fn profile(&self, request: ProfileRequest) -> Result<ProfileResponse, Error> {
        Err(Error::not_found(format!(
            "user {} not found",
            request.username
        )))
    }
}
