// handlers/protected/enrollments.rs - /api/enrollments

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Json, Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::format::{EnrollmentListItem, EnrollmentView};
use crate::api::{PageRequest, Pagination};
use crate::config;
use crate::database::models::Enrollment;
use crate::handlers::{body, non_blank, params};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::enrollments::EnrollInput;
use crate::services::EnrollmentService;
use crate::types::EnrollmentStatus;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EnrollmentListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentList {
    pub enrollments: Vec<EnrollmentListItem>,
    pub pagination: Pagination,
}

/// POST /api/enrollments - Enroll the caller in a published course
///
/// Expected Input: `{ "courseId": "uuid" }`
pub async fn enroll(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<EnrollInput>, JsonRejection>,
) -> ApiResult<EnrollmentView> {
    let input = body(payload)?;
    let enrollment = EnrollmentService::new(state.pool).enroll(user.user_id, input).await?;
    Ok(ApiResponse::created(enrollment))
}

/// GET /api/enrollments - The caller's enrollments with progress
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<EnrollmentListParams>, QueryRejection>,
) -> ApiResult<EnrollmentList> {
    let p = params(query)?;
    let api = &config::config().api;
    let page = PageRequest::parse(
        p.page.as_deref(),
        p.limit.as_deref(),
        api.default_enrollment_page_size,
        api.max_page_size,
    )?;
    let status = non_blank(p.status)
        .map(|s| s.trim().to_uppercase().parse::<EnrollmentStatus>())
        .transpose()?;

    let (enrollments, pagination) = EnrollmentService::new(state.pool).list(user.user_id, status, page).await?;
    Ok(ApiResponse::success(EnrollmentList { enrollments, pagination }))
}

/// DELETE /api/enrollments/:id - Cancel one of the caller's enrollments
pub async fn cancel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Enrollment> {
    let Path(id) = id?;
    let enrollment = EnrollmentService::new(state.pool).cancel(user.user_id, id).await?;
    Ok(ApiResponse::success(enrollment))
}
