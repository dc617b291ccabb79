//! Admin API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{canned_sources, listing, TestApp};

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let app = TestApp::new().await;
    let customer = app.register_customer().await;
    let body = json!({ "title": "Space Cat", "price": 350 });

    let (status, _) = app.post_json("/api/admin/products", body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post_json_auth("/api/admin/products", body, customer.token())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_product_and_option_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.create_admin().await;

    let (status, category) = app
        .post_json_auth(
            "/api/admin/categories",
            json!({ "name": "Animals", "slug": "animals" }),
            admin.token(),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, product) = app
        .post_json_auth(
            "/api/admin/products",
            json!({ "title": "Space Cat", "price": 350, "categoryId": category["id"] }),
            admin.token(),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_i64().unwrap();

    let (status, option) = app
        .post_json_auth(
            &format!("/api/admin/products/{}/options", product_id),
            json!({ "optionType": "finish", "value": "matte", "priceModifier": 25 }),
            admin.token(),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(option["inStock"], true);

    let (status, option) = app
        .patch_json_auth(
            &format!("/api/admin/options/{}", option["id"]),
            json!({ "inStock": false }),
            admin.token(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(option["inStock"], false);

    let (status, product) = app
        .patch_json_auth(
            &format!("/api/admin/products/{}", product_id),
            json!({ "price": 400 }),
            admin.token(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["price"], 400);
    assert_eq!(product["title"], "Space Cat");

    let (status, _) = app
        .delete_auth(&format!("/api/admin/products/{}", product_id), admin.token())
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/products/{}", product_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_product_rejects_unknown_category() {
    let app = TestApp::new().await;
    let admin = app.create_admin().await;

    let (status, _) = app
        .post_json_auth(
            "/api/admin/products",
            json!({ "title": "Space Cat", "price": 350, "categoryId": 42 }),
            admin.token(),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_status_moves_forward_only() {
    let app = TestApp::new().await;
    let buyer = app.register_customer().await;
    let admin = app.create_admin().await;
    let product_id = app.create_product("Boba Tea", 275).await;
    app.post_json_auth("/api/cart", json!({ "productId": product_id }), buyer.token())
        .await;
    let (_, order) = app
        .post_json_auth(
            "/api/orders",
            json!({ "shippingAddress": "1 Sticker Lane" }),
            buyer.token(),
        )
        .await;
    let uri = format!("/api/admin/orders/{}/status", order["id"]);

    let (status, body) = app
        .patch_json_auth(&uri, json!({ "status": "shipped" }), admin.token())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "shipped");

    let (status, _) = app
        .patch_json_auth(&uri, json!({ "status": "processing" }), admin.token())
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .patch_json_auth(&uri, json!({ "status": "lost" }), admin.token())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .patch_json_auth(
            "/api/admin/orders/999/status",
            json!({ "status": "shipped" }),
            admin.token(),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_marketplace_unconfigured() {
    let app = TestApp::new().await;
    let admin = app.create_admin().await;

    let (status, _) = app
        .post_json_auth("/api/admin/marketplace/sync", json!({}), admin.token())
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = app
        .get_auth("/api/admin/marketplace/listings", admin.token())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["listings"].as_array().unwrap().is_empty());

    let (status, _) = app
        .post_json_auth("/api/admin/marketplace/import", json!({}), admin.token())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_marketplace_sync_then_import() {
    let app = TestApp::with_state(|state| {
        state.with_marketplace(canned_sources(vec![
            listing("v1|100", "Holo Cat", Some(450)),
            listing("v1|200", "Inventory Only", None),
            listing("v1|300", "Retro Van", Some(300)),
        ]))
    });
    let admin = app.create_admin().await;

    let (status, report) = app
        .post_json_auth("/api/admin/marketplace/sync", json!({}), admin.token())
        .await;
    assert_eq!(status, StatusCode::OK, "sync failed: {}", report);
    assert_eq!(report["count"], 3);
    assert_eq!(report["source"], "canned");

    let (_, view) = app
        .get_auth("/api/admin/marketplace/listings", admin.token())
        .await;
    assert_eq!(view["listings"].as_array().unwrap().len(), 3);

    let (status, report) = app
        .post_json_auth("/api/admin/marketplace/import", json!({}), admin.token())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["imported"], 2);
    assert_eq!(report["updated"], 0);
    assert_eq!(report["failed"][0]["itemId"], "v1|200");
    assert_eq!(report["failed"][0]["error"], "missing price");

    let (status, report) = app
        .post_json_auth(
            "/api/admin/marketplace/import",
            json!({ "itemIds": ["v1|100"] }),
            admin.token(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["imported"], 0);
    assert_eq!(report["updated"], 1);

    let (_, products) = app.get("/api/products?q=holo").await;
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["externalId"], "v1|100");
    assert_eq!(products[0]["price"], 450);
}
