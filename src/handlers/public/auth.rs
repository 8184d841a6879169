// handlers/public/auth.rs - POST /auth/register and POST /auth/login

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::format::{LoginResponse, PublicUser};
use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::error::ApiError;
use crate::handlers::body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::users::{LoginInput, RegisterInput};
use crate::services::UserService;
use crate::AppState;

/// POST /auth/register - Create a student account
///
/// Expected Input:
/// ```json
/// { "name": "Ada", "email": "ada@example.com", "password": "at least 8 chars" }
/// ```
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> ApiResult<PublicUser> {
    if !config::config().security.allow_registration {
        return Err(ApiError::forbidden("Registration is disabled"));
    }
    let input = body(payload)?;
    let user = UserService::new(state.pool).register(input).await?;
    Ok(ApiResponse::created(PublicUser::from(&user)))
}

/// POST /auth/login - Exchange credentials for a session token
///
/// Expected Output:
/// ```json
/// { "success": true, "data": { "token": "eyJ...", "expiresIn": 86400, "user": { ... } } }
/// ```
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let input = body(payload)?;
    let user = UserService::new(state.pool).authenticate(input).await?;

    let claims = Claims::new(user.id, user.email.clone(), user.name.clone(), user.role);
    let token = generate_jwt(&claims)?;
    tracing::info!("User {} logged in", user.id);

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: claims.expires_in(),
        user: PublicUser::from(&user),
    }))
}
