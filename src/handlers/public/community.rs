// handlers/public/community.rs - review, discussion and reply listings

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::format::{DiscussionView, ReplyView, ReviewView};
use crate::handlers::params;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::discussions::{DiscussionQuery, ReplyQuery};
use crate::services::reviews::ReviewQuery;
use crate::services::{DiscussionService, ReviewService};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewParams {
    pub course_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionParams {
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyParams {
    pub discussion_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// GET /api/reviews - newest first
pub async fn list_reviews(
    State(state): State<AppState>,
    query: Result<Query<ReviewParams>, QueryRejection>,
) -> ApiResult<Vec<ReviewView>> {
    let p = params(query)?;
    let reviews = ReviewService::new(state.pool)
        .list(ReviewQuery { course_id: p.course_id, user_id: p.user_id })
        .await?;
    Ok(ApiResponse::success(reviews))
}

/// GET /api/discussions - newest first, replies oldest first
pub async fn list_discussions(
    State(state): State<AppState>,
    query: Result<Query<DiscussionParams>, QueryRejection>,
) -> ApiResult<Vec<DiscussionView>> {
    let p = params(query)?;
    let discussions = DiscussionService::new(state.pool)
        .list(DiscussionQuery { course_id: p.course_id, lesson_id: p.lesson_id, user_id: p.user_id })
        .await?;
    Ok(ApiResponse::success(discussions))
}

/// GET /api/replies - oldest first
pub async fn list_replies(
    State(state): State<AppState>,
    query: Result<Query<ReplyParams>, QueryRejection>,
) -> ApiResult<Vec<ReplyView>> {
    let p = params(query)?;
    let replies = DiscussionService::new(state.pool)
        .list_replies(ReplyQuery { discussion_id: p.discussion_id, user_id: p.user_id })
        .await?;
    Ok(ApiResponse::success(replies))
}
