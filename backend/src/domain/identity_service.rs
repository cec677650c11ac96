//! Identity domain services: registration, login, and profile reads.
//!
//! Login failures are deliberately uniform so the endpoint does not reveal
//! which usernames exist.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    CredentialHasher, CredentialHasherError, IdentityCommand, IdentityQuery, LoginRequest,
    LoginResponse, LoginService, ProfileRequest, ProfileResponse, RegisterRequest,
    RegisterResponse, UserRepository, UserRepositoryError,
};
use crate::domain::{EmailAddress, Error, Role, User};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;

const BAD_CREDENTIALS: &str = "invalid username or password";

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("identity store unavailable: {message}"))
        }
        UserRepositoryError::DuplicateUsername => {
            Error::conflict("an account with this username already exists")
        }
        UserRepositoryError::DuplicateEmail => {
            Error::conflict("an account with this email already exists")
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("identity store error: {message}"))
        }
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(error.to_string())
}

/// Identity service implementing registration, login, and profile ports.
#[derive(Clone)]
pub struct IdentityService<U> {
    users: Arc<U>,
    hasher: Arc<dyn CredentialHasher>,
}

impl<U> IdentityService<U> {
    /// Create an identity service over the user repository and a hasher.
    pub fn new(users: Arc<U>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<U> IdentityCommand for IdentityService<U>
where
    U: UserRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, Error> {
        let email = EmailAddress::new(request.email)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if request.password.chars().count() < PASSWORD_MIN {
            return Err(Error::invalid_request(format!(
                "password must be at least {PASSWORD_MIN} characters"
            )));
        }

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(map_hasher_error)?;
        let user = User::new(Uuid::new_v4(), request.username, email, Role::User, true);

        self.users
            .create(&user, &password_hash)
            .await
            .map_err(map_user_error)?;

        info!(username = %user.username(), user_id = %user.id(), "account registered");
        Ok(RegisterResponse { user: user.into() })
    }
}

#[async_trait]
impl<U> LoginService for IdentityService<U>
where
    U: UserRepository,
{
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, Error> {
        let Some(credentials) = self
            .users
            .find_credentials(&request.username)
            .await
            .map_err(map_user_error)?
        else {
            warn!(username = %request.username, "login for unknown account");
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };

        let verified = self
            .hasher
            .verify(&request.password, &credentials.password_hash)
            .map_err(map_hasher_error)?;
        if !verified {
            warn!(username = %request.username, "login with wrong password");
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }
        if !credentials.user.is_enabled() {
            warn!(username = %request.username, "login for disabled account");
            return Err(Error::forbidden("account is disabled"));
        }

        info!(username = %request.username, "login succeeded");
        Ok(LoginResponse {
            user: credentials.user.into(),
        })
    }
}

#[async_trait]
impl<U> IdentityQuery for IdentityService<U>
where
    U: UserRepository,
{
    async fn profile(&self, request: ProfileRequest) -> Result<ProfileResponse, Error> {
        let user = self
            .users
            .find_by_username(&request.username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", request.username)))?;

        Ok(ProfileResponse { user: user.into() })
    }
}
