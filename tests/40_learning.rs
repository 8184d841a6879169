mod common;

use axum::http::StatusCode;
use maaeen::types::UserRole;

const COURSE: &str = "6f1c1f8e-0000-4000-8000-000000000001";

#[tokio::test]
async fn anonymous_enrollment_check_is_not_enrolled() {
    let (status, body) = common::get(&format!("/api/enrollments/check?courseId={COURSE}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enrolled"], false);
}

#[tokio::test]
async fn enrollment_check_needs_course_id() {
    let token = common::token(UserRole::Student);
    let (status, body) = common::get("/api/enrollments/check", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["courseId"].is_string());
}

#[tokio::test]
async fn enrollments_require_a_session() {
    let (status, _) = common::get("/api/enrollments", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = common::post("/api/progress", None, "{}").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn review_rating_out_of_range() {
    let token = common::token(UserRole::Student);
    for rating in [0, 6] {
        let body = format!(r#"{{"courseId":"{COURSE}","rating":{rating},"comment":"ok"}}"#);
        let (status, resp) = common::post("/api/reviews", Some(&token), &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {rating}");
        assert_eq!(resp["error"], "Rating must be between 1 and 5");
    }
}

#[tokio::test]
async fn review_filter_must_be_uuid() {
    let (status, _) = common::get("/api/reviews?courseId=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn discussion_needs_course_or_lesson() {
    let token = common::token(UserRole::Student);
    let (status, resp) =
        common::post("/api/discussions", Some(&token), r#"{"title":"Help","content":"Stuck on lesson 2"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["success"], false);
}
