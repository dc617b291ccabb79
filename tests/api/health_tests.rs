//! Health Check API Tests

use axum::http::StatusCode;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

/// Liveness never depends on integrations
#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_store_and_integrations() {
    let app = TestApp::new().await;
    app.register_customer().await;

    let (status, body) = app.get("/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store"]["users"], 1);
    assert_eq!(body["store"]["orders"], 0);
    assert_eq!(body["websocketConnections"], 0);
    assert_eq!(body["integrations"]["payments"], false);
    assert_eq!(body["integrations"]["marketplace"], false);
    assert_eq!(body["integrations"]["images"], false);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_request_counter() {
    let app = TestApp::new().await;
    app.get("/health").await;

    let (status, body) = app.get("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().expect("metrics are plain text");
    assert!(text.contains("sticker_shop_http_requests_total"));
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
