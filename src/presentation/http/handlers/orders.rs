//! Checkout and Order Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::CheckoutRequest;
use crate::application::services::{OrderDetail, OrderService};
use crate::domain::{Conversation, Order, UserRepository};
use crate::infrastructure::payments::PaymentIntent;
use crate::presentation::middleware::AuthUser;
use crate::presentation::websocket::ServerEvent;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Push `order_updated` to the buyer and every admin, best effort.
pub(crate) async fn notify_order_updated(state: &AppState, order: &Order) {
    let mut recipients = match state.store.admin_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(order_id = order.id, error = %e, "Could not load admins for order update");
            Vec::new()
        }
    };
    recipients.push(order.user_id);
    recipients.sort_unstable();
    recipients.dedup();

    state.gateway.send_to_users(
        &recipients,
        &ServerEvent::OrderUpdated {
            data: order.clone(),
        },
    );
}

/// Payment intent for the current cart total
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PaymentIntent>, AppError> {
    Ok(Json(state.order_service().create_payment_intent(auth.user_id).await?))
}

/// Turn the cart into an order
pub async fn checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderDetail>), AppError> {
    body.validate().map_err(validation_error)?;

    let detail = state
        .order_service()
        .checkout(
            auth.user_id,
            body.shipping_address.trim().to_string(),
            body.payment_intent_id.filter(|id| !id.trim().is_empty()),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Own orders; admins see all
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(
        state
            .order_service()
            .list_orders(auth.user_id, auth.is_admin)
            .await?,
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderDetail>, AppError> {
    Ok(Json(
        state
            .order_service()
            .get_order(auth.user_id, auth.is_admin, order_id)
            .await?,
    ))
}

/// Buyer cancellation while pending
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(order_id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .order_service()
        .cancel_order(auth.user_id, order_id)
        .await?;
    notify_order_updated(&state, &order).await;
    Ok(Json(order))
}

/// The order's conversation, created on first access
pub async fn order_conversation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(order_id): Path<i64>,
) -> Result<Json<Conversation>, AppError> {
    Ok(Json(
        state
            .order_service()
            .order_conversation(auth.user_id, auth.is_admin, order_id)
            .await?,
    ))
}
