// handlers/protected/catalog.rs - POST /api/courses and POST /api/categories
//
// Both routes require an INSTRUCTOR or ADMIN session.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Json, State};

use crate::api::format::CreatedCourse;
use crate::database::models::Category;
use crate::handlers::body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::catalog::{NewCategory, NewCourse};
use crate::services::CatalogService;
use crate::AppState;

/// POST /api/courses - Create a DRAFT course
///
/// Expected Input:
/// ```json
/// {
///   "title": "string",
///   "description": "string",
///   "level": "BEGINNER",
///   "price": 0,                 // optional, >= 0
///   "thumbnail": "url",         // optional
///   "categoryId": "uuid",       // optional
///   "instructorId": "uuid"      // optional, honoured for admins only
/// }
/// ```
pub async fn create_course(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewCourse>, JsonRejection>,
) -> ApiResult<CreatedCourse> {
    let input = body(payload)?;
    let course = CatalogService::new(state.pool).create_course(&user, input).await?;
    Ok(ApiResponse::created(course))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> ApiResult<Category> {
    let input = body(payload)?;
    let category = CatalogService::new(state.pool).create_category(input).await?;
    Ok(ApiResponse::created(category))
}
