// handlers/public/enrollment.rs - GET /api/enrollments/check
//
// Mounted behind optional_auth_middleware: anonymous callers get an answer
// instead of a 401.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::format::EnrollmentCheck;
use crate::error::ApiError;
use crate::handlers::params;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::EnrollmentService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckParams {
    pub course_id: Option<Uuid>,
}

pub async fn check(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    query: Result<Query<CheckParams>, QueryRejection>,
) -> ApiResult<EnrollmentCheck> {
    let Some(Extension(user)) = user else {
        return Ok(ApiResponse::success(EnrollmentCheck::anonymous()));
    };
    let course_id = params(query)?
        .course_id
        .ok_or_else(|| ApiError::field("courseId", "courseId is required"))?;

    let enrollment = EnrollmentService::new(state.pool).check(user.user_id, course_id).await?;
    Ok(ApiResponse::success(EnrollmentCheck::found(enrollment)))
}
