//! Cart API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_cart_requires_authentication() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/cart").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_identical_lines_merge_and_totals_follow() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;
    let product_id = app.create_product("Sleepy Fox", 300).await;
    let line = json!({
        "productId": product_id,
        "quantity": 2,
        "options": { "size": "2in", "material": "vinyl" },
    });

    let (status, first) = app.post_json_auth("/api/cart", line.clone(), user.token()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, second) = app.post_json_auth("/api/cart", line, user.token()).await;
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["quantity"], 4);

    let (status, cart) = app.get_auth("/api/cart", user.token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["product"]["title"], "Sleepy Fox");
    assert_eq!(cart["items"][0]["quote"]["unitPrice"], 300);
    assert_eq!(cart["totals"]["total"], 1_200);
}

#[tokio::test]
async fn test_add_rejects_unpriceable_selection() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;
    let product_id = app.create_product("Sleepy Fox", 300).await;

    let (status, _) = app
        .post_json_auth(
            "/api/cart",
            json!({ "productId": product_id, "options": { "material": "glitter" } }),
            user.token(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json_auth("/api/cart", json!({ "productId": 999 }), user.token())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_quantity_and_zero_removes() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;
    let product_id = app.create_product("Sleepy Fox", 300).await;
    let (_, item) = app
        .post_json_auth("/api/cart", json!({ "productId": product_id }), user.token())
        .await;
    let uri = format!("/api/cart/{}", item["id"]);

    let (status, body) = app
        .patch_json_auth(&uri, json!({ "quantity": 5 }), user.token())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 5);

    let (status, _) = app
        .patch_json_auth(&uri, json!({ "quantity": 0 }), user.token())
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, cart) = app.get_auth("/api/cart", user.token()).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

/// Other users' lines look like missing lines
#[tokio::test]
async fn test_cannot_touch_another_users_line() {
    let app = TestApp::new().await;
    let owner = app.register_customer().await;
    let other = app.register_customer().await;
    let product_id = app.create_product("Sleepy Fox", 300).await;
    let (_, item) = app
        .post_json_auth("/api/cart", json!({ "productId": product_id }), owner.token())
        .await;

    let (status, _) = app
        .delete_auth(&format!("/api/cart/{}", item["id"]), other.token())
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_cart() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;
    let product_id = app.create_product("Sleepy Fox", 300).await;
    app.post_json_auth("/api/cart", json!({ "productId": product_id }), user.token())
        .await;

    let (status, _) = app.delete_auth("/api/cart", user.token()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, cart) = app.get_auth("/api/cart", user.token()).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
    assert_eq!(cart["totals"]["total"], 0);
}
