// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Maaeen API",
            "version": version,
            "description": "E-learning platform: courses, enrollments, progress, reviews and discussions",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login (public), /api/auth/whoami (protected)",
                "courses": "/api/courses[/:id] (public read, instructor write)",
                "categories": "/api/categories (public read, instructor write)",
                "enrollments": "/api/enrollments[/check|/:id] (protected)",
                "progress": "/api/progress (protected)",
                "reviews": "/api/reviews (public read, protected write)",
                "discussions": "/api/discussions, /api/replies (public read, protected write)",
                "admin": "/api/admin/* (admin only)",
            }
        }
    }))
}

/// 200 when the database answers `SELECT 1`, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
