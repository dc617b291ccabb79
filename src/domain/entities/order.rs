//! Order and order item entities and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Conversation;
use crate::shared::error::AppError;

/// Order lifecycle.
///
/// ```text
/// pending -> processing -> awaiting_approval -> in_production -> shipped -> delivered
///    \___________\_______________\__________________\______________\-----> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    AwaitingApproval,
    InProduction,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Parse the snake_case wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "awaiting_approval" => Some(Self::AwaitingApproval),
            "in_production" => Some(Self::InProduction),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::AwaitingApproval => "awaiting_approval",
            Self::InProduction => "in_production",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Position in the forward lifecycle; `None` for cancelled.
    fn stage(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Processing => Some(1),
            Self::AwaitingApproval => Some(2),
            Self::InProduction => Some(3),
            Self::Shipped => Some(4),
            Self::Delivered => Some(5),
            Self::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Forward moves may skip stages; cancellation is allowed from any
    /// non-terminal status.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(current), Some(target)) => target > current,
            (None, Some(_)) => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A purchase record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    /// Total charged in cents
    pub total: i64,
    pub shipping_address: String,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order, priced at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price in cents at purchase time
    pub price: i64,
    pub options: serde_json::Value,
    pub custom_design_url: Option<String>,
}

/// Fields required to insert an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub status: OrderStatus,
    pub total: i64,
    pub shipping_address: String,
    pub payment_intent_id: Option<String>,
}

/// Fields required to insert an order item; the order id is filled in by
/// the store.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i32,
    pub price: i64,
    pub options: serde_json::Value,
    pub custom_design_url: Option<String>,
}

/// A cart row an order was built from and the quantity it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumedLine {
    pub cart_item_id: i64,
    pub quantity: i32,
}

/// Everything `place_order` wrote.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub conversation: Conversation,
}

/// Repository trait for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order together with its items under one write.
    async fn create_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<(Order, Vec<OrderItem>), AppError>;

    /// Checkout commit. Under one write: rejects an intent that already paid
    /// for an order with `Conflict`, inserts the order and its items, takes
    /// the consumed quantities out of the cart and opens the order's
    /// conversation. Cart rows not listed in `consumed` are left alone.
    async fn place_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
        consumed: &[ConsumedLine],
    ) -> Result<PlacedOrder, AppError>;

    async fn find_order(&self, id: i64) -> Result<Option<Order>, AppError>;

    /// Orders of a user, newest first.
    async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AppError>;

    /// Every order, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, AppError>;

    async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, AppError>;

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<Order, AppError>;
}
