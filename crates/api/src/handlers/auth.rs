//! Handlers for the `/auth` resource (signup, login, current user).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use slotswap_core::error::CoreError;
use slotswap_db::models::user::{CreateUser, User, UserResponse};
use slotswap_db::repositories::UserRepo;
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by signup and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a new user and return an access token. Duplicate emails are
/// rejected with 409 by the `uq_users_email` constraint.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    input.validate().map_err(CoreError::from)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: auth_response(&state, user)?,
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Unknown emails and wrong passwords
/// produce the same 401 so accounts cannot be enumerated.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(DataResponse {
        data: auth_response(&state, user)?,
    }))
}

/// GET /api/v1/auth/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: user.into() }))
}

fn auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = generate_access_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: user.into(),
    })
}
