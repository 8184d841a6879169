// handlers/protected/discussions.rs - POST /api/discussions and POST /api/replies

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Json, State};

use crate::api::format::{DiscussionView, ReplyView};
use crate::handlers::body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::discussions::{NewDiscussion, NewReply};
use crate::services::DiscussionService;
use crate::AppState;

/// POST /api/discussions
///
/// Expected Input:
/// ```json
/// { "title": "string", "content": "string", "courseId": "uuid", "lessonId": "uuid" }
/// ```
/// At least one of `courseId` and `lessonId` is required.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewDiscussion>, JsonRejection>,
) -> ApiResult<DiscussionView> {
    let input = body(payload)?;
    let discussion = DiscussionService::new(state.pool).create(user.user_id, input).await?;
    Ok(ApiResponse::created(discussion))
}

pub async fn reply(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewReply>, JsonRejection>,
) -> ApiResult<ReplyView> {
    let input = body(payload)?;
    let reply = DiscussionService::new(state.pool).reply(user.user_id, input).await?;
    Ok(ApiResponse::created(reply))
}
