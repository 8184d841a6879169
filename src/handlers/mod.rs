// handlers/mod.rs - Handler tiers
//
// Public (no session) → Protected (session required) → Elevated (ADMIN session)
//
// Handlers stay thin: extract, call a service, wrap the result in ApiResponse.
pub mod public;
pub mod protected;
pub mod elevated;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};

use crate::error::ApiError;

/// Unwrap a JSON body, turning extractor rejections into the API error envelope.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = payload?;
    Ok(value)
}

/// Unwrap query parameters, turning extractor rejections into the API error envelope.
pub(crate) fn params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    let Query(value) = query?;
    Ok(value)
}

/// Blank query values count as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
