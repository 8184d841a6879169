// handlers/protected/auth.rs - GET /api/auth/whoami

use axum::extract::{Extension, State};

use crate::api::format::PublicUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UserService;
use crate::AppState;

/// The session's account, re-read so role and name changes show up.
pub async fn whoami(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<PublicUser> {
    let account = UserService::new(state.pool).find(user.user_id).await?;
    Ok(ApiResponse::success(PublicUser::from(&account)))
}
