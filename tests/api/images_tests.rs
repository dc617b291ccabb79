//! Background Removal API Tests

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use sticker_shop::infrastructure::images::{ImageError, ImageProcessor, ImageSource};

use crate::common::TestApp;

/// Echoes a fixed PNG payload
struct FakeImages;

#[async_trait]
impl ImageProcessor for FakeImages {
    async fn remove_background(&self, source: &ImageSource) -> Result<Vec<u8>, ImageError> {
        match source {
            ImageSource::Url(url) if url.contains("broken") => Err(ImageError::Api {
                status: 400,
                message: "could not identify foreground".into(),
            }),
            _ => Ok(b"png".to_vec()),
        }
    }
}

#[tokio::test]
async fn test_unconfigured_processor_is_unavailable() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;

    let (status, _) = app
        .post_json_auth(
            "/api/images/remove-background",
            json!({ "imageUrl": "https://img.example/cat.jpg" }),
            user.token(),
        )
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_remove_background_returns_data_url() {
    let app = TestApp::with_state(|state| state.with_images(Arc::new(FakeImages)));
    let user = app.register_customer().await;

    let (status, body) = app
        .post_json_auth(
            "/api/images/remove-background",
            json!({ "imageData": "data:image/jpeg;base64,AAAA" }),
            user.token(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image"], "data:image/png;base64,cG5n");
}

#[tokio::test]
async fn test_remove_background_errors() {
    let app = TestApp::with_state(|state| state.with_images(Arc::new(FakeImages)));
    let user = app.register_customer().await;

    let (status, _) = app
        .post_json_auth("/api/images/remove-background", json!({}), user.token())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json_auth(
            "/api/images/remove-background",
            json!({ "imageUrl": "https://img.example/broken.jpg" }),
            user.token(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
