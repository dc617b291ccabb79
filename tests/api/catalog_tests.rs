//! Catalog API Tests

use axum::http::StatusCode;
use serde_json::json;
use sticker_shop::domain::{CategoryRepository, NewProduct, ProductRepository};

use crate::common::TestApp;

#[tokio::test]
async fn test_list_products_filters_by_category_and_search() {
    let app = TestApp::new().await;
    let animals = app
        .store
        .create_category("Animals".into(), "animals".into(), None)
        .await
        .unwrap();
    for (title, category_id) in [("Space Cat", Some(animals.id)), ("Pizza Slice", None)] {
        app.store
            .create_product(NewProduct {
                title: title.into(),
                description: String::new(),
                image_url: String::new(),
                price: 300,
                category_id,
                external_id: None,
            })
            .await
            .unwrap();
    }

    let (status, body) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app
        .get(&format!("/api/products?category={}", animals.id))
        .await;
    assert_eq!(body[0]["title"], "Space Cat");
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/products?q=PIZZA").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Pizza Slice");

    let (_, body) = app.get("/api/categories").await;
    assert_eq!(body[0]["slug"], "animals");
}

#[tokio::test]
async fn test_get_product_includes_options() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Space Cat", 350).await;

    let (status, body) = app.get(&format!("/api/products/{}", product_id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Space Cat");
    assert_eq!(body["options"].as_array().unwrap().len(), 5);
    assert_eq!(body["options"][0]["optionType"], "size");
}

#[tokio::test]
async fn test_get_missing_product_returns_404() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/products/999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10001);
}

/// 350 base, holographic x1.25 = 438, +50 for 3in = 488 each; 50 units earn 10%
#[tokio::test]
async fn test_quote_applies_material_modifier_and_discount() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Space Cat", 350).await;

    let (status, body) = app
        .post_json(
            &format!("/api/products/{}/quote", product_id),
            json!({
                "options": { "size": "3in", "material": "holographic" },
                "quantity": 50,
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unitPrice"], 488);
    assert_eq!(body["subtotal"], 24_400);
    assert_eq!(body["discountPercent"], 10);
    assert_eq!(body["discount"], 2_440);
    assert_eq!(body["total"], 21_960);
}

#[tokio::test]
async fn test_quote_rejects_bad_selection() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Space Cat", 350).await;
    let uri = format!("/api/products/{}/quote", product_id);

    let (status, _) = app
        .post_json(&uri, json!({ "options": { "size": "10in" }, "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post_json(&uri, json!({ "options": { "material": "glitter" }, "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("out of stock"));

    let (status, _) = app.post_json(&uri, json!({ "quantity": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
