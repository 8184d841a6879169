// handlers/elevated/admin.rs - /api/admin/*

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::format::{ActivityItem, AdminCourseItem, AdminStats, CreatedCourse, PublicUser};
use crate::database::models::Course;
use crate::handlers::{body, non_blank, params};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::admin::{AdminCourseQuery, CoursePatch};
use crate::services::catalog::NewCourse;
use crate::services::AdminService;
use crate::types::CourseStatus;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminCourseParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
    pub deleted: bool,
}

/// GET /api/admin/stats
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "totalUsers": 120, "totalCourses": 14, "totalEnrollments": 310,
///     "totalReviews": 58, "recentUsers": 9, "recentCourses": 2
///   }
/// }
/// ```
pub async fn stats(State(state): State<AppState>) -> ApiResult<AdminStats> {
    Ok(ApiResponse::success(AdminService::new(state.pool).stats().await?))
}

/// GET /api/admin/activity - At most 10 entries, newest first
pub async fn activity(State(state): State<AppState>) -> ApiResult<Vec<ActivityItem>> {
    Ok(ApiResponse::success(AdminService::new(state.pool).activity().await?))
}

pub async fn list_courses(
    State(state): State<AppState>,
    query: Result<Query<AdminCourseParams>, QueryRejection>,
) -> ApiResult<Vec<AdminCourseItem>> {
    let p = params(query)?;
    let status = non_blank(p.status)
        .map(|s| s.trim().to_uppercase().parse::<CourseStatus>())
        .transpose()?;
    let courses = AdminService::new(state.pool)
        .courses(AdminCourseQuery { search: non_blank(p.search), status, sort: non_blank(p.sort) })
        .await?;
    Ok(ApiResponse::success(courses))
}

/// POST /api/admin/courses - `instructorId` is required, `status` defaults to DRAFT
pub async fn create_course(
    State(state): State<AppState>,
    payload: Result<Json<NewCourse>, JsonRejection>,
) -> ApiResult<CreatedCourse> {
    let input = body(payload)?;
    let course = AdminService::new(state.pool).create_course(input).await?;
    Ok(ApiResponse::created(course))
}

/// PATCH /api/admin/courses/:id - Partial update; status follows the course lifecycle
pub async fn update_course(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CoursePatch>, JsonRejection>,
) -> ApiResult<Course> {
    let Path(id) = id?;
    let patch = body(payload)?;
    let course = AdminService::new(state.pool).update_course(id, patch).await?;
    Ok(ApiResponse::success(course))
}

pub async fn delete_course(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Deleted> {
    let Path(id) = id?;
    AdminService::new(state.pool).delete_course(id).await?;
    Ok(ApiResponse::success(Deleted { id, deleted: true }))
}

pub async fn instructors(State(state): State<AppState>) -> ApiResult<Vec<PublicUser>> {
    Ok(ApiResponse::success(AdminService::new(state.pool).instructors().await?))
}
