//! Cart item entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A line in a user's cart.
///
/// `options` is the opaque selection blob sent by the customizer, e.g.
/// `{"size": "3in", "material": "holographic", "customDesignUrl": "..."}`.
/// Two adds with the same product and structurally equal options collapse
/// into one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub options: serde_json::Value,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Whether an add of (product, options) should merge into this row.
    pub fn same_line(&self, product_id: i64, options: &serde_json::Value) -> bool {
        self.product_id == product_id && &self.options == options
    }
}

/// Repository trait for cart rows.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Cart rows of a user, ordered by ID.
    async fn cart_items(&self, user_id: i64) -> Result<Vec<CartItem>, AppError>;

    async fn find_cart_item(&self, id: i64) -> Result<Option<CartItem>, AppError>;

    /// Add to the cart, incrementing the quantity of an identical
    /// (product, options) row instead of inserting a duplicate.
    async fn add_cart_item(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i32,
        options: serde_json::Value,
    ) -> Result<CartItem, AppError>;

    async fn set_cart_quantity(&self, id: i64, quantity: i32) -> Result<CartItem, AppError>;

    async fn remove_cart_item(&self, id: i64) -> Result<(), AppError>;

    /// Remove every row of a user's cart.
    async fn clear_cart(&self, user_id: i64) -> Result<(), AppError>;
}
