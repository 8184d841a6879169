mod common;

use axum::http::StatusCode;
use maaeen::types::UserRole;

#[tokio::test]
async fn admin_routes_require_admin_role() {
    for path in ["/api/admin/stats", "/api/admin/activity", "/api/admin/courses", "/api/admin/instructors"] {
        let (status, _) = common::get(path, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");

        let token = common::token(UserRole::Student);
        let (status, _) = common::get(path, Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path}");

        let token = common::token(UserRole::Instructor);
        let (status, body) = common::get(path, Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path}");
        common::assert_error(&body, "FORBIDDEN");
    }
}

#[tokio::test]
async fn admin_course_update_requires_admin() {
    let token = common::token(UserRole::Instructor);
    let (status, _) = common::send(
        axum::http::Method::PATCH,
        "/api/admin/courses/6f1c1f8e-0000-4000-8000-000000000002",
        Some(&token),
        Some(r#"{"status":"PUBLISHED"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_course_sort_is_whitelisted() {
    let token = common::token(UserRole::Admin);
    let (status, body) = common::get("/api/admin/courses?sort=password_hash%20desc", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["sort"].is_string());
}

#[tokio::test]
async fn admin_course_sort_direction_must_be_asc_or_desc() {
    let token = common::token(UserRole::Admin);
    for sort in ["title%20sideways", "title%20asc%20desc"] {
        let (status, body) = common::get(&format!("/api/admin/courses?sort={sort}"), Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{sort}");
        assert!(body["field_errors"]["sort"].is_string());
    }
}
