mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn root_describes_the_api() {
    let (status, body) = common::get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Maaeen API");
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let (status, body) = common::get("/health", None).await;
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {status}"
    );
    assert!(body["data"]["status"].is_string());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = common::get("/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
