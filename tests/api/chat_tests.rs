//! Conversation API Tests

use axum::http::StatusCode;
use serde_json::json;

use sticker_shop::domain::UserRepository;
use sticker_shop::presentation::websocket::{handle_frame, SessionState};

use crate::common::{drain_events, TestApp};

#[tokio::test]
async fn test_direct_conversation_is_reused() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;

    let (status, first) = app
        .post_json_auth("/api/conversations/direct", json!({}), user.token())
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = app
        .post_json_auth("/api/conversations/direct", json!({}), user.token())
        .await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["isDirect"], true);
    assert_eq!(first["userId"], user.id);
}

#[tokio::test]
async fn test_send_and_list_messages() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;
    let (_, conversation) = app
        .post_json_auth("/api/conversations/direct", json!({}), user.token())
        .await;
    let uri = format!("/api/conversations/{}/messages", conversation["id"]);

    let (status, message) = app
        .post_json_auth(&uri, json!({ "content": "  Can you do 5in?  " }), user.token())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["content"], "Can you do 5in?");
    assert_eq!(message["type"], "text");

    let (status, messages) = app.get_auth(&uri, user.token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 1);

    let (_, summaries) = app.get_auth("/api/conversations", user.token()).await;
    assert_eq!(summaries[0]["lastMessage"]["content"], "Can you do 5in?");
}

#[tokio::test]
async fn test_message_content_rules() {
    let app = TestApp::new().await;
    let user = app.register_customer().await;
    let (_, conversation) = app
        .post_json_auth("/api/conversations/direct", json!({}), user.token())
        .await;
    let uri = format!("/api/conversations/{}/messages", conversation["id"]);

    let (status, _) = app
        .post_json_auth(&uri, json!({ "content": "   " }), user.token())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json_auth(&uri, json!({ "messageType": "image" }), user.token())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json_auth(&uri, json!({ "content": "hi", "messageType": "video" }), user.token())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, message) = app
        .post_json_auth(
            &uri,
            json!({ "messageType": "image", "imageUrl": "https://img.example/proof.png" }),
            user.token(),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["imageUrl"], "https://img.example/proof.png");
}

#[tokio::test]
async fn test_conversations_are_private_but_admins_see_all() {
    let app = TestApp::new().await;
    let owner = app.register_customer().await;
    let stranger = app.register_customer().await;
    let admin = app.create_admin().await;
    let (_, conversation) = app
        .post_json_auth("/api/conversations/direct", json!({}), owner.token())
        .await;
    let uri = format!("/api/conversations/{}/messages", conversation["id"]);

    let (status, _) = app.get_auth(&uri, stranger.token()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post_json_auth(&uri, json!({ "content": "Proof is ready" }), admin.token())
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, all) = app.get_auth("/api/conversations", admin.token()).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, _) = app
        .get_auth("/api/conversations/999/messages", owner.token())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rest_message_reaches_owner_and_admins_only() {
    let app = TestApp::new().await;
    let owner = app.register_customer().await;
    let stranger = app.register_customer().await;
    let admin = app.create_admin().await;
    let (_, conversation) = app
        .post_json_auth("/api/conversations/direct", json!({}), owner.token())
        .await;

    let mut owner_socket = app.connect(owner.id);
    let mut admin_socket = app.connect(admin.id);
    let mut stranger_socket = app.connect(stranger.id);

    let uri = format!("/api/conversations/{}/messages", conversation["id"]);
    let (status, message) = app
        .post_json_auth(&uri, json!({ "content": "Is holographic in stock?" }), owner.token())
        .await;
    assert_eq!(status, StatusCode::CREATED);

    for socket in [&mut owner_socket, &mut admin_socket] {
        let events = drain_events(socket);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "new_message");
        assert_eq!(events[0]["data"]["id"], message["id"]);
        assert_eq!(events[0]["data"]["content"], "Is holographic in stock?");
    }
    assert!(drain_events(&mut stranger_socket).is_empty());
}

#[tokio::test]
async fn test_admin_status_change_pushes_order_update() {
    let app = TestApp::new().await;
    let buyer = app.register_customer().await;
    let stranger = app.register_customer().await;
    let admin = app.create_admin().await;
    let product_id = app.create_product("Comet", 300).await;
    app.post_json_auth(
        "/api/cart",
        json!({ "productId": product_id, "quantity": 1, "options": { "size": "2in" } }),
        buyer.token(),
    )
    .await;
    let (status, order) = app
        .post_json_auth("/api/orders", json!({ "shippingAddress": "2 Orbit Rd" }), buyer.token())
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut buyer_socket = app.connect(buyer.id);
    let mut admin_socket = app.connect(admin.id);
    let mut stranger_socket = app.connect(stranger.id);

    let (status, _) = app
        .patch_json_auth(
            &format!("/api/admin/orders/{}/status", order["id"]),
            json!({ "status": "processing" }),
            admin.token(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    for socket in [&mut buyer_socket, &mut admin_socket] {
        let events = drain_events(socket);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "order_updated");
        assert_eq!(events[0]["data"]["id"], order["id"]);
        assert_eq!(events[0]["data"]["status"], "processing");
    }
    assert!(drain_events(&mut stranger_socket).is_empty());
}

#[tokio::test]
async fn test_socket_uses_current_admin_flag() {
    let app = TestApp::new().await;
    let owner = app.register_customer().await;
    let admin = app.create_admin().await;
    let (_, conversation) = app
        .post_json_auth("/api/conversations/direct", json!({}), owner.token())
        .await;

    // Session opened while the account was still an admin
    let user = app.store.find_by_id(admin.id).await.unwrap().unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let session = SessionState::new(&user, app.state.gateway.register(admin.id, tx));
    app.store
        .write()
        .users
        .get_mut(&admin.id)
        .unwrap()
        .is_admin = false;

    let frame = json!({
        "type": "message",
        "conversationId": conversation["id"],
        "content": "Proof attached",
    });
    handle_frame(&frame.to_string(), &session, &app.state).await;

    let events = drain_events(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "error");
    assert_eq!(app.store.counts().messages, 0);
}
