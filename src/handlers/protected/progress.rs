// handlers/protected/progress.rs - /api/progress

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Json, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::format::{ProgressUpdate, ProgressView};
use crate::handlers::{body, params};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::progress::{ProgressInput, ProgressQuery};
use crate::services::ProgressService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressParams {
    pub course_id: Option<Uuid>,
    pub enrollment_id: Option<Uuid>,
}

/// POST /api/progress - Mark a lesson watched or completed
///
/// Expected Input:
/// ```json
/// { "lessonId": "uuid", "enrollmentId": "uuid", "completed": true, "watchTime": 540 }
/// ```
///
/// Expected Output: the progress row plus the enrollment's new `progressPercentage`.
pub async fn record(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ProgressInput>, JsonRejection>,
) -> ApiResult<ProgressUpdate> {
    let input = body(payload)?;
    let update = ProgressService::new(state.pool).record(user.user_id, input).await?;
    Ok(ApiResponse::success(update))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ProgressParams>, QueryRejection>,
) -> ApiResult<Vec<ProgressView>> {
    let p = params(query)?;
    let rows = ProgressService::new(state.pool)
        .list(user.user_id, ProgressQuery { course_id: p.course_id, enrollment_id: p.enrollment_id })
        .await?;
    Ok(ApiResponse::success(rows))
}
