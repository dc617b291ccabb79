//! Checkout and Order API Tests

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{FakePayments, TestApp, TestUser};

async fn fill_cart(app: &TestApp, user: &TestUser, quantity: i32) {
    let product_id = app.create_product("Mountain Sunrise", 300).await;
    let (status, _) = app
        .post_json_auth(
            "/api/cart",
            json!({
                "productId": product_id,
                "quantity": quantity,
                "options": { "size": "3in", "customDesignUrl": "https://img.example/d.png" },
            }),
            user.token(),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_checkout_without_payments_creates_pending_order() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;
    fill_cart(&app, &user, 2).await;

    let (status, order) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane" }),
            user.token(),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total"], 700);
    assert_eq!(order["items"][0]["price"], 350);
    assert_eq!(order["items"][0]["customDesignUrl"], "https://img.example/d.png");

    let (_, cart) = app.get_auth("/api/cart", user.token()).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    let (_, conversations) = app.get_auth("/api/conversations", user.token()).await;
    assert_eq!(conversations.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_empty_cart_is_bad_request() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;

    let (status, _) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane" }),
            user.token(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_intent_unavailable_without_processor() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;
    fill_cart(&app, &user, 1).await;

    let (status, _) = app
        .post_json_auth("/api/checkout/payment-intent", json!({}), user.token())
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_paid_checkout_verifies_intent_once() {
    let payments = Arc::new(FakePayments::default());
    let app = TestApp::with_state({
        let payments = payments.clone();
        move |state| state.with_payments(payments)
    });
    let user = app.register_customer().await;
    fill_cart(&app, &user, 2).await;

    let (status, _) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane" }),
            user.token(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "payment intent is required");

    payments.insert("pi_short", 100, "succeeded");
    let (status, _) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane", "paymentIntentId": "pi_short" }),
            user.token(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "amount must match the cart");

    let (status, intent) = app
        .post_json_auth("/api/checkout/payment-intent", json!({}), user.token())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(intent["amount"], 700);
    let intent_id = intent["id"].as_str().unwrap().to_string();

    let (status, order) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane", "paymentIntentId": intent_id }),
            user.token(),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "processing");
    assert_eq!(order["paymentIntentId"], intent_id.as_str());

    fill_cart(&app, &user, 2).await;
    let (status, _) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane", "paymentIntentId": intent_id }),
            user.token(),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_orders_are_private_to_their_buyer() {
    let app = TestApp::new().await;
    let buyer = app.register_customer().await;
    let other = app.register_customer().await;
    let admin = app.create_admin().await;
    fill_cart(&app, &buyer, 1).await;
    let (_, order) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane" }),
            buyer.token(),
        )
        .await;
    let uri = format!("/api/orders/{}", order["id"]);

    let (status, _) = app.get_auth(&uri, other.token()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get_auth(&uri, admin.token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], buyer.id);

    let (_, mine) = app.get_auth("/api/orders", other.token()).await;
    assert!(mine.as_array().unwrap().is_empty());
    let (_, all) = app.get_auth("/api/orders", admin.token()).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_buyer_cancels_only_pending_orders() {
    let app = TestApp::new().await;
    let buyer = app.register_customer().await;
    let admin = app.create_admin().await;
    fill_cart(&app, &buyer, 1).await;
    let (_, order) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane" }),
            buyer.token(),
        )
        .await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, _) = app
        .patch_json_auth(
            &format!("/api/admin/orders/{}/status", order_id),
            json!({ "status": "in_production" }),
            admin.token(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post_json_auth(
            &format!("/api/orders/{}/cancel", order_id),
            json!({}),
            buyer.token(),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_pending_order() {
    let app = TestApp::new().await;
    let buyer = app.register_customer().await;
    fill_cart(&app, &buyer, 1).await;
    let (_, order) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane" }),
            buyer.token(),
        )
        .await;

    let (status, body) = app
        .post_json_auth(
            &format!("/api/orders/{}/cancel", order["id"]),
            json!({}),
            buyer.token(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
async fn test_order_conversation_is_stable() {
    let app = TestApp::new().await;
    let buyer = app.register_customer().await;
    fill_cart(&app, &buyer, 1).await;
    let (_, order) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane" }),
            buyer.token(),
        )
        .await;
    let uri = format!("/api/orders/{}/conversation", order["id"]);

    let (status, first) = app.get_auth(&uri, buyer.token()).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = app.get_auth(&uri, buyer.token()).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["orderId"], order["id"]);
}
