//! Order Service
//!
//! Checkout (cart to order), payment intents, order lookup and the status
//! lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::cart_service::{CartError, CartService, CartServiceImpl, CartView};
use crate::domain::{
    CartRepository, ConsumedLine, Conversation, ConversationRepository, NewOrder, NewOrderItem,
    Order, OrderItem, OrderRepository, OrderStatus, ProductRepository,
};
use crate::infrastructure::payments::{PaymentError, PaymentGateway, PaymentIntent};
use crate::shared::error::AppError;

/// Cart option key holding an uploaded design.
const CUSTOM_DESIGN_KEY: &str = "customDesignUrl";

/// Order with its line items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cart line cannot be priced: {0}")]
    UnpricedLine(String),

    #[error("Order not found")]
    OrderNotFound,

    #[error("Not allowed to access this order")]
    Forbidden,

    #[error("Only pending orders can be cancelled (order is {0})")]
    NotCancellable(OrderStatus),

    #[error("Unknown order status: {0}")]
    InvalidStatus(String),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Payments are not configured")]
    PaymentsUnavailable,

    #[error("A payment intent is required")]
    PaymentRequired,

    #[error("Payment has not succeeded (status: {0})")]
    PaymentNotSucceeded(String),

    #[error("Payment amount {actual} does not match order total {expected}")]
    AmountMismatch { expected: i64, actual: i64 },

    #[error("Payment intent was already used for another order")]
    IntentAlreadyUsed,

    #[error("Payment processor error: {0}")]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound => AppError::NotFound(err.to_string()),
            OrderError::Forbidden => AppError::Forbidden(err.to_string()),
            OrderError::NotCancellable(_)
            | OrderError::InvalidTransition { .. }
            | OrderError::IntentAlreadyUsed => AppError::Conflict(err.to_string()),
            OrderError::PaymentsUnavailable => AppError::Unavailable(err.to_string()),
            OrderError::Payment(_) => AppError::Upstream(err.to_string()),
            OrderError::Cart(e) => e.into(),
            OrderError::Store(e) => e,
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

/// Order service trait
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Create a payment intent for the caller's current cart total
    async fn create_payment_intent(&self, user_id: i64) -> Result<PaymentIntent, OrderError>;

    /// Turn the caller's cart into an order, open its conversation and
    /// empty the cart
    async fn checkout(
        &self,
        user_id: i64,
        shipping_address: String,
        payment_intent_id: Option<String>,
    ) -> Result<OrderDetail, OrderError>;

    /// Own orders; admins see every order
    async fn list_orders(&self, user_id: i64, is_admin: bool) -> Result<Vec<Order>, OrderError>;

    async fn get_order(&self, user_id: i64, is_admin: bool, order_id: i64) -> Result<OrderDetail, OrderError>;

    /// Buyer cancellation, only while pending
    async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<Order, OrderError>;

    /// Admin status change along the lifecycle
    async fn update_status(&self, order_id: i64, status: &str) -> Result<Order, OrderError>;

    /// The order's conversation, created on first access if missing
    async fn order_conversation(
        &self,
        user_id: i64,
        is_admin: bool,
        order_id: i64,
    ) -> Result<Conversation, OrderError>;
}

/// OrderService implementation
pub struct OrderServiceImpl<R>
where
    R: OrderRepository + CartRepository + ProductRepository + ConversationRepository,
{
    repo: Arc<R>,
    payments: Option<Arc<dyn PaymentGateway>>,
    currency: String,
}

impl<R> OrderServiceImpl<R>
where
    R: OrderRepository + CartRepository + ProductRepository + ConversationRepository + 'static,
{
    pub fn new(repo: Arc<R>, payments: Option<Arc<dyn PaymentGateway>>, currency: String) -> Self {
        Self {
            repo,
            payments,
            currency,
        }
    }

    /// Priced, non-empty cart of a user.
    async fn checkout_cart(&self, user_id: i64) -> Result<CartView, OrderError> {
        let cart = CartServiceImpl::new(self.repo.clone()).get_cart(user_id).await?;

        if cart.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        if let Some(line) = cart.items.iter().find(|l| l.quote.is_none()) {
            return Err(OrderError::UnpricedLine(format!(
                "{}: {}",
                line.product.title,
                line.error.as_deref().unwrap_or("unpriced")
            )));
        }

        Ok(cart)
    }

    /// Confirm a payment intent pays exactly this cart.
    async fn verify_payment(
        &self,
        gateway: &dyn PaymentGateway,
        payment_intent_id: Option<String>,
        total: i64,
    ) -> Result<String, OrderError> {
        let intent_id = payment_intent_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(OrderError::PaymentRequired)?;

        let already_used = self
            .repo
            .list_orders()
            .await?
            .iter()
            .any(|o| o.payment_intent_id.as_deref() == Some(intent_id.as_str()));
        if already_used {
            return Err(OrderError::IntentAlreadyUsed);
        }

        let intent = gateway.retrieve_intent(&intent_id).await?;
        if !intent.is_succeeded() {
            return Err(OrderError::PaymentNotSucceeded(intent.status));
        }
        if intent.amount != total {
            return Err(OrderError::AmountMismatch {
                expected: total,
                actual: intent.amount,
            });
        }

        Ok(intent.id)
    }

    /// Load an order the caller may see.
    async fn visible_order(&self, user_id: i64, is_admin: bool, order_id: i64) -> Result<Order, OrderError> {
        let order = self
            .repo
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if !is_admin && order.user_id != user_id {
            return Err(OrderError::Forbidden);
        }
        Ok(order)
    }
}

#[async_trait]
impl<R> OrderService for OrderServiceImpl<R>
where
    R: OrderRepository + CartRepository + ProductRepository + ConversationRepository + 'static,
{
    async fn create_payment_intent(&self, user_id: i64) -> Result<PaymentIntent, OrderError> {
        let gateway = self.payments.as_ref().ok_or(OrderError::PaymentsUnavailable)?;
        let cart = self.checkout_cart(user_id).await?;

        let intent = gateway
            .create_intent(
                cart.totals.total,
                &self.currency,
                &[("user_id", user_id.to_string())],
            )
            .await?;

        tracing::info!(user_id, intent_id = %intent.id, amount = intent.amount, "Payment intent created");
        Ok(intent)
    }

    async fn checkout(
        &self,
        user_id: i64,
        shipping_address: String,
        payment_intent_id: Option<String>,
    ) -> Result<OrderDetail, OrderError> {
        let cart = self.checkout_cart(user_id).await?;
        let total = cart.totals.total;

        let (status, payment_intent_id) = match &self.payments {
            Some(gateway) => {
                let intent_id = self
                    .verify_payment(gateway.as_ref(), payment_intent_id, total)
                    .await?;
                (OrderStatus::Processing, Some(intent_id))
            }
            None => (OrderStatus::Pending, None),
        };

        let mut consumed = Vec::with_capacity(cart.items.len());
        let mut items = Vec::with_capacity(cart.items.len());
        for line in cart.items {
            let Some(quote) = line.quote else { continue };
            let custom_design_url = line
                .item
                .options
                .get(CUSTOM_DESIGN_KEY)
                .and_then(|v| v.as_str())
                .map(str::to_string);
            consumed.push(ConsumedLine {
                cart_item_id: line.item.id,
                quantity: quote.quantity,
            });
            items.push(NewOrderItem {
                product_id: line.item.product_id,
                quantity: quote.quantity,
                price: quote.unit_price,
                options: line.item.options,
                custom_design_url,
            });
        }

        let placed = self
            .repo
            .place_order(
                NewOrder {
                    user_id,
                    status,
                    total,
                    shipping_address,
                    payment_intent_id,
                },
                items,
                &consumed,
            )
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => OrderError::IntentAlreadyUsed,
                other => OrderError::Store(other),
            })?;
        let (order, items) = (placed.order, placed.items);

        tracing::info!(order_id = order.id, user_id, total, status = %order.status, "Order placed");
        Ok(OrderDetail { order, items })
    }

    async fn list_orders(&self, user_id: i64, is_admin: bool) -> Result<Vec<Order>, OrderError> {
        if is_admin {
            Ok(self.repo.list_orders().await?)
        } else {
            Ok(self.repo.orders_for_user(user_id).await?)
        }
    }

    async fn get_order(&self, user_id: i64, is_admin: bool, order_id: i64) -> Result<OrderDetail, OrderError> {
        let order = self.visible_order(user_id, is_admin, order_id).await?;
        let items = self.repo.order_items(order.id).await?;
        Ok(OrderDetail { order, items })
    }

    async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<Order, OrderError> {
        let order = self.visible_order(user_id, false, order_id).await?;

        if order.status != OrderStatus::Pending {
            return Err(OrderError::NotCancellable(order.status));
        }

        let order = self
            .repo
            .update_order_status(order.id, OrderStatus::Cancelled)
            .await?;
        tracing::info!(order_id = order.id, user_id, "Order cancelled by buyer");
        Ok(order)
    }

    async fn update_status(&self, order_id: i64, status: &str) -> Result<Order, OrderError> {
        let next = OrderStatus::parse(status).ok_or_else(|| OrderError::InvalidStatus(status.to_string()))?;
        let order = self
            .repo
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if !order.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let updated = self.repo.update_order_status(order_id, next).await?;
        tracing::info!(order_id, from = %order.status, to = %next, "Order status updated");
        Ok(updated)
    }

    async fn order_conversation(
        &self,
        user_id: i64,
        is_admin: bool,
        order_id: i64,
    ) -> Result<Conversation, OrderError> {
        let order = self.visible_order(user_id, is_admin, order_id).await?;
        Ok(self.repo.order_conversation(order.id, order.user_id).await?)
    }
}
