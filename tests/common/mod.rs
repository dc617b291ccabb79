//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use sticker_shop::config::{
    CorsSettings, ImageSettings, JwtSettings, MarketplaceSettings, PaymentSettings, ServerSettings,
    Settings, StoreSettings, WebSocketSettings,
};
use sticker_shop::domain::{NewProduct, NewProductOption, NewUser, OptionType, ProductRepository, UserRepository};
use sticker_shop::infrastructure::marketplace::{
    ListingSource, ListingSources, MarketplaceError, MarketplaceListing,
};
use sticker_shop::infrastructure::payments::{PaymentError, PaymentGateway, PaymentIntent};
use sticker_shop::infrastructure::store::MemoryStore;
use sticker_shop::presentation::websocket::Outbound;
use sticker_shop::shared::password::hash_password;
use sticker_shop::startup::{build_router, AppState};

pub const ADMIN_PASSWORD: &str = "admin-password";

/// Settings with every integration switched off and a private snapshot dir
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-at-least-32-chars".into(),
            access_token_expiry_minutes: 60,
            refresh_token_expiry_days: 30,
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings {
            max_message_size: 65536,
            heartbeat_interval_secs: 30,
            auth_timeout_secs: 10,
        },
        store: StoreSettings {
            seed_sample_data: false,
        },
        marketplace: MarketplaceSettings {
            api_base_url: "http://127.0.0.1:9".into(),
            access_token: None,
            seller_id: None,
            marketplace_id: "EBAY_US".into(),
            page_size: 100,
            snapshot_dir: std::env::temp_dir()
                .join(format!("sticker-shop-it-{}", Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
        },
        payments: PaymentSettings {
            api_base_url: "http://127.0.0.1:9".into(),
            secret_key: None,
            currency: "usd".into(),
        },
        images: ImageSettings {
            endpoint: None,
            api_key: None,
        },
        environment: "test".into(),
    }
}

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    /// The state behind `router`; its gateway is the live socket registry
    pub state: AppState,
}

impl TestApp {
    /// Application over an empty store with no integrations
    pub async fn new() -> Self {
        Self::with_state(|state| state)
    }

    /// Application whose state is adjusted before the router is built,
    /// e.g. to plug in fake integrations
    pub fn with_state(configure: impl FnOnce(AppState) -> AppState) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = configure(AppState::new(test_settings(), store.clone()).expect("state builds"));
        Self {
            router: build_router(state.clone()),
            store,
            state,
        }
    }

    /// Attach a fake socket for `user_id` and return the receiving end
    pub fn connect(&self, user_id: i64) -> mpsc::UnboundedReceiver<Outbound> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.gateway.register(user_id, tx);
        rx
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, Some(token)).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn post_json_auth(&self, uri: &str, body: Value, token: &str) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), Some(token)).await
    }

    pub async fn patch_json_auth(&self, uri: &str, body: Value, token: &str) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body), Some(token)).await
    }

    pub async fn delete_auth(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, Some(token)).await
    }

    /// Register a fresh customer through the API
    pub async fn register_customer(&self) -> TestUser {
        let user = TestUser::new();
        let (status, body) = self
            .post_json(
                "/api/auth/register",
                json!({
                    "username": user.username,
                    "email": user.email,
                    "password": user.password,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        user.with_session(&body)
    }

    /// Insert an admin into the store and log in through the API
    pub async fn create_admin(&self) -> TestUser {
        let user = TestUser {
            password: ADMIN_PASSWORD.into(),
            ..TestUser::new()
        };
        self.store
            .create(NewUser {
                username: user.username.clone(),
                email: user.email.clone(),
                password_hash: hash_password(&user.password).unwrap(),
                display_name: None,
                is_admin: true,
            })
            .await
            .unwrap();

        let (status, body) = self
            .post_json(
                "/api/auth/login",
                json!({ "username": user.username, "password": user.password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);
        user.with_session(&body)
    }

    /// A product priced at `price` cents with a small option grid
    pub async fn create_product(&self, title: &str, price: i64) -> i64 {
        let product = self
            .store
            .create_product(NewProduct {
                title: title.into(),
                description: format!("{} sticker", title),
                image_url: String::new(),
                price,
                category_id: None,
                external_id: None,
            })
            .await
            .unwrap();

        for (option_type, value, modifier, in_stock) in [
            (OptionType::Size, "2in", 0, true),
            (OptionType::Size, "3in", 50, true),
            (OptionType::Material, "vinyl", 0, true),
            (OptionType::Material, "holographic", 0, true),
            (OptionType::Material, "glitter", 0, false),
        ] {
            self.store
                .create_option(NewProductOption {
                    product_id: product.id,
                    option_type,
                    value: value.into(),
                    price_modifier: modifier,
                    in_stock,
                })
                .await
                .unwrap();
        }

        product.id
    }
}

/// Test user fixture
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    pub fn new() -> Self {
        Self {
            id: 0,
            username: unique_username(),
            email: unique_email(),
            password: "password123".to_string(),
            access_token: String::new(),
            refresh_token: String::new(),
        }
    }

    fn with_session(mut self, body: &Value) -> Self {
        self.id = body["user"]["id"].as_i64().expect("user id in auth response");
        self.access_token = body["accessToken"].as_str().unwrap_or_default().to_string();
        self.refresh_token = body["refreshToken"].as_str().unwrap_or_default().to_string();
        self
    }

    pub fn token(&self) -> &str {
        &self.access_token
    }
}

/// Decoded JSON frames queued on a fake socket
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(outbound) = rx.try_recv() {
        if let Outbound::Text(text) = outbound {
            events.push(serde_json::from_str(&text).unwrap());
        }
    }
    events
}

/// Generate a unique email for testing
pub fn unique_email() -> String {
    format!("test_{}@example.com", Uuid::new_v4().simple())
}

/// Generate a unique username for testing
pub fn unique_username() -> String {
    format!("user_{}", &Uuid::new_v4().simple().to_string()[..8])
}

/// Payment processor double: intents succeed unless marked otherwise
#[derive(Default)]
pub struct FakePayments {
    intents: Mutex<HashMap<String, PaymentIntent>>,
}

impl FakePayments {
    /// Register an intent directly, bypassing `create_intent`
    pub fn insert(&self, id: &str, amount: i64, status: &str) {
        self.intents.lock().insert(
            id.to_string(),
            PaymentIntent {
                id: id.to_string(),
                client_secret: None,
                amount,
                currency: "usd".into(),
                status: status.into(),
            },
        );
    }
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        _metadata: &[(&str, String)],
    ) -> Result<PaymentIntent, PaymentError> {
        let id = format!("pi_{}", Uuid::new_v4().simple());
        let intent = PaymentIntent {
            id: id.clone(),
            client_secret: Some(format!("{}_secret", id)),
            amount,
            currency: currency.to_string(),
            status: "succeeded".into(),
        };
        self.intents.lock().insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        self.intents
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| PaymentError::Api {
                status: 404,
                message: format!("No such payment_intent: {}", id),
            })
    }
}

/// Listing source that returns a fixed set, or fails
pub struct CannedListings {
    pub listings: Option<Vec<MarketplaceListing>>,
}

#[async_trait]
impl ListingSource for CannedListings {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn fetch_listings(&self) -> Result<Vec<MarketplaceListing>, MarketplaceError> {
        self.listings.clone().ok_or_else(|| MarketplaceError::Api {
            status: 503,
            message: "unavailable".into(),
        })
    }
}

/// Sources whose primary fails and whose fallback returns `listings`
pub fn canned_sources(listings: Vec<MarketplaceListing>) -> ListingSources {
    ListingSources {
        primary: Arc::new(CannedListings { listings: None }),
        fallback: Arc::new(CannedListings {
            listings: Some(listings),
        }),
    }
}

pub fn listing(item_id: &str, title: &str, price_cents: Option<i64>) -> MarketplaceListing {
    MarketplaceListing {
        item_id: item_id.into(),
        title: title.into(),
        description: String::new(),
        price_cents,
        currency: Some("USD".into()),
        image_url: None,
        quantity: Some(3),
        url: None,
    }
}
