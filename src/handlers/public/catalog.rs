// handlers/public/catalog.rs - course and category reads

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::format::{CourseDetail, CourseListItem};
use crate::api::{PageRequest, Pagination};
use crate::config;
use crate::database::models::Category;
use crate::handlers::{non_blank, params};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::catalog::CourseQuery;
use crate::services::CatalogService;
use crate::types::CourseLevel;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CourseListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CourseList {
    pub courses: Vec<CourseListItem>,
    pub pagination: Pagination,
}

/// GET /api/courses - Published catalog, newest first
pub async fn list_courses(
    State(state): State<AppState>,
    query: Result<Query<CourseListParams>, QueryRejection>,
) -> ApiResult<CourseList> {
    let p = params(query)?;
    let api = &config::config().api;
    let page = PageRequest::parse(p.page.as_deref(), p.limit.as_deref(), api.default_page_size, api.max_page_size)?;
    let level = non_blank(p.level).map(|l| l.trim().to_uppercase().parse::<CourseLevel>()).transpose()?;

    let filters = CourseQuery { category: non_blank(p.category), level, search: non_blank(p.search) };
    let (courses, pagination) = CatalogService::new(state.pool).list_courses(filters, page).await?;
    Ok(ApiResponse::success(CourseList { courses, pagination }))
}

/// GET /api/courses/:id - One course in any status, with lessons and reviews
pub async fn get_course(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CourseDetail> {
    let Path(id) = id?;
    let course = CatalogService::new(state.pool).get_course(id).await?;
    Ok(ApiResponse::success(course))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(CatalogService::new(state.pool).list_categories().await?))
}
