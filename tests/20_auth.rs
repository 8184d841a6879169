mod common;

use axum::http::StatusCode;
use maaeen::types::UserRole;

#[tokio::test]
async fn register_rejects_bad_email_before_lookup() {
    let (status, body) = common::post(
        "/auth/register",
        None,
        r#"{"name":"Ada","email":"not-an-email","password":"longenough"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    common::assert_error(&body, "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
}

#[tokio::test]
async fn register_rejects_short_password() {
    let (status, body) =
        common::post("/auth/register", None, r#"{"name":"Ada","email":"ada@example.com","password":"123"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["password"].is_string());
}

#[tokio::test]
async fn malformed_json_is_invalid_json() {
    let (status, body) = common::post("/auth/login", None, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    common::assert_error(&body, "INVALID_JSON");
}

#[tokio::test]
async fn whoami_requires_a_session() {
    let (status, body) = common::get("/api/auth/whoami", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    common::assert_error(&body, "UNAUTHORIZED");

    let (status, _) = common::get("/api/auth/whoami", Some("garbage.token.value")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_session_reaches_the_handler() {
    let token = common::token(UserRole::Instructor);
    let (status, body) = common::get("/api/auth/whoami", Some(&token)).await;
    // The account lookup fails without a database, but the session was accepted.
    assert_ne!(status, StatusCode::UNAUTHORIZED);
    assert_ne!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
}
