//! Authentication HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/register
//! POST /api/v1/auth/login
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```
//!
//! On login the resolved username is persisted into the session cookie;
//! every other authenticated endpoint reads it back through
//! [`SessionContext`]. The domain only ever sees the resolved username.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{LoginRequest, ProfileRequest, RegisterRequest, UserPayload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_username};

/// Request payload for registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    /// Desired account name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Request payload for login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    /// Account name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// One account as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    /// Account identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Unique account name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Moderation role.
    pub role: String,
    /// Whether the account may act.
    pub enabled: bool,
}

impl From<UserPayload> for UserBody {
    fn from(value: UserPayload) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username.to_string(),
            email: value.email,
            role: value.role.to_string(),
            enabled: value.enabled,
        }
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterBody,
    responses(
        (status = 200, description = "Account created", body = UserBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username or email taken", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register"
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<web::Json<UserBody>> {
    let body = payload.into_inner();
    let username = parse_username(body.username, FieldName::new("username"))?;

    let response = state
        .identity
        .register(RegisterRequest {
            username,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(web::Json(response.user.into()))
}

/// Verify credentials and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Logged in", body = UserBody),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 403, description = "Account disabled", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<UserBody>> {
    let body = payload.into_inner();
    let username = parse_username(body.username, FieldName::new("username"))?;

    let response = state
        .login
        .login(LoginRequest {
            username,
            password: body.password,
        })
        .await?;

    session.persist_user(&response.user.username)?;
    Ok(web::Json(response.user.into()))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Logged out")),
    tags = ["auth"],
    operation_id = "logout",
    security(("SessionCookie" = []))
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The authenticated caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Caller profile", body = UserBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "me",
    security(("SessionCookie" = []))
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserBody>> {
    let username = session.require_username()?;

    let response = state.profiles.profile(ProfileRequest { username }).await?;

    Ok(web::Json(response.user.into()))
}
