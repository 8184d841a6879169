// handlers/protected/reviews.rs - POST /api/reviews

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Json, State};
use axum::http::StatusCode;

use crate::api::format::SavedReview;
use crate::handlers::body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::reviews::ReviewInput;
use crate::services::ReviewService;
use crate::AppState;

/// 201 for a new review, 200 when the caller's earlier review was replaced.
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ReviewInput>, JsonRejection>,
) -> ApiResult<SavedReview> {
    let input = body(payload)?;
    let saved = ReviewService::new(state.pool).submit(user.user_id, input).await?;
    let status = if saved.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok(ApiResponse::with_status(saved, status))
}
