//! Authentication API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{unique_email, unique_username, TestApp, TestUser};

#[tokio::test]
async fn test_register_returns_user_and_tokens() {
    let app = TestApp::new().await;
    let user = TestUser::new();

    let (status, body) = app
        .post_json(
            "/api/auth/register",
            json!({
                "username": user.username,
                "email": user.email,
                "password": user.password,
                "displayName": "Sticker Fan",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], user.username.as_str());
    assert_eq!(body["user"]["displayName"], "Sticker Fan");
    assert_eq!(body["user"]["isAdmin"], false);
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["accessToken"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refreshToken"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = TestApp::new().await;
    let existing = app.register_customer().await;

    let (status, _) = app
        .post_json(
            "/api/auth/register",
            json!({
                "username": existing.username,
                "email": unique_email(),
                "password": "password123",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/api/auth/register",
            json!({
                "username": unique_username(),
                "email": "not-an-email",
                "password": "123",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_login_with_username_or_email() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;

    for login in [&user.username, &user.email] {
        let (status, body) = app
            .post_json(
                "/api/auth/login",
                json!({ "username": login, "password": user.password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login as {}", login);
        assert_eq!(body["user"]["id"], user.id);
    }
}

#[tokio::test]
async fn test_login_wrong_password_unauthorized() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;

    let (status, _) = app
        .post_json(
            "/api/auth/login",
            json!({ "username": user.username, "password": "wrong-password" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;

    let (status, _) = app.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get_auth("/api/auth/me", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get_auth("/api/auth/me", user.token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], user.username.as_str());
}

#[tokio::test]
async fn test_refresh_then_logout_revokes() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;

    let (status, body) = app
        .post_json(
            "/api/auth/refresh",
            json!({ "refreshToken": user.refresh_token }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["refreshToken"].as_str().unwrap().to_string();
    assert!(body["accessToken"].is_string());

    let (status, _) = app
        .post_json("/api/auth/logout", json!({ "refreshToken": rotated }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .post_json("/api/auth/refresh", json!({ "refreshToken": rotated }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Logout succeeds even for tokens the server never issued
#[tokio::test]
async fn test_logout_unknown_token_is_no_content() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post_json("/api/auth/logout", json!({ "refreshToken": "unknown" }))
        .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}
