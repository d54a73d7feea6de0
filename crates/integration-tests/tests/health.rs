//! Health checks, static files and request IDs.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Request, StatusCode};

use bikeshop_integration_tests::{INDEX_HTML, TestApp};

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_readiness_checks_database() {
    let app = TestApp::spawn().await;
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);

    app.pool().close().await;
    assert_eq!(
        app.get("/health/ready").await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_front_page_is_served() {
    let app = TestApp::spawn().await;
    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), INDEX_HTML);
}

#[tokio::test]
async fn test_missing_static_file_is_not_found() {
    let app = TestApp::spawn().await;
    let response = app.get("/static/images/nope.jpg").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = TestApp::spawn().await;
    let response = app.get("/health").await;

    let id = response
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = TestApp::spawn().await;
    let request = Request::get("/products")
        .header("x-request-id", "upstream-abc-123")
        .body(Body::empty())
        .unwrap();

    let response = app.request(request).await;
    assert_eq!(
        response.headers.get("x-request-id").unwrap(),
        "upstream-abc-123"
    );
}
