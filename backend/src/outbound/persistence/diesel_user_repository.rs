//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{StoredCredentials, UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, Role, User, Username};

use super::diesel_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    match unique_violation_constraint(&error) {
        Some(constraint) if constraint.contains("email") => {
            UserRepositoryError::duplicate_email()
        }
        Some(_) => UserRepositoryError::duplicate_username(),
        None => map_basic_diesel_error(
            error,
            UserRepositoryError::query,
            UserRepositoryError::connection,
        ),
    }
}

/// Convert an account row into a validated domain user.
fn row_to_user(row: &UserRow) -> Result<User, UserRepositoryError> {
    let username = Username::new(row.username.as_str())
        .map_err(|err| UserRepositoryError::query(format!("stored username invalid: {err}")))?;
    let email = EmailAddress::new(row.email.as_str())
        .map_err(|err| UserRepositoryError::query(format!("stored email invalid: {err}")))?;
    let role: Role = row
        .role
        .parse()
        .map_err(|_| UserRepositoryError::query(format!("unknown role: {}", row.role)))?;

    Ok(User::new(row.id, username, email, role, row.enabled))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User, password_hash: &str) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: user.id(),
            username: user.username().as_ref(),
            email: user.email().as_ref(),
            password_hash,
            role: user.role().as_str(),
            enabled: user.is_enabled(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, user_id: &Uuid) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(user_id))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            let user = row_to_user(&row)?;
            Ok(StoredCredentials {
                user,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }
}
