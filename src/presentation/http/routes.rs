//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use super::handlers;
use crate::presentation::middleware::{auth_middleware, require_admin};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        // Chat socket; authenticates with its first frame
        .route("/ws", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(handlers::health::metrics_handler))
        .with_state(state)
}

/// `/api` routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .nest("/admin", admin_routes(state))
}

/// Authentication and catalog (public)
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh_token))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/categories", get(handlers::catalog::list_categories))
        .route("/products", get(handlers::catalog::list_products))
        .route("/products/{id}", get(handlers::catalog::get_product))
        .route("/products/{id}/quote", post(handlers::catalog::quote))
}

/// Customer routes (protected)
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        // Cart
        .route(
            "/cart",
            get(handlers::cart::get_cart)
                .post(handlers::cart::add_item)
                .delete(handlers::cart::clear_cart),
        )
        .route(
            "/cart/{id}",
            patch(handlers::cart::update_item).delete(handlers::cart::remove_item),
        )
        // Checkout & orders
        .route(
            "/checkout/payment-intent",
            post(handlers::orders::create_payment_intent),
        )
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::checkout),
        )
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route("/orders/{id}/cancel", post(handlers::orders::cancel_order))
        .route(
            "/orders/{id}/conversation",
            get(handlers::orders::order_conversation),
        )
        // Conversations
        .route(
            "/conversations",
            get(handlers::conversations::list_conversations),
        )
        .route(
            "/conversations/direct",
            post(handlers::conversations::direct_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            get(handlers::conversations::get_messages).post(handlers::conversations::send_message),
        )
        // Images
        .route(
            "/images/remove-background",
            post(handlers::images::remove_background),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Admin routes (protected + admin)
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/products", post(handlers::admin::create_product))
        .route(
            "/products/{id}",
            patch(handlers::admin::update_product).delete(handlers::admin::delete_product),
        )
        .route("/products/{id}/options", post(handlers::admin::create_option))
        .route(
            "/options/{id}",
            patch(handlers::admin::update_option).delete(handlers::admin::delete_option),
        )
        .route("/categories", post(handlers::admin::create_category))
        .route(
            "/orders/{id}/status",
            patch(handlers::admin::update_order_status),
        )
        .route("/marketplace/sync", post(handlers::admin::marketplace_sync))
        .route(
            "/marketplace/listings",
            get(handlers::admin::marketplace_listings),
        )
        .route(
            "/marketplace/import",
            post(handlers::admin::marketplace_import),
        )
        // Layers run bottom-up: authenticate, then check the admin flag
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
