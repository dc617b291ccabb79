//! Cart Repository Implementation

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::domain::{CartItem, CartRepository};
use crate::infrastructure::store::MemoryStore;
use crate::shared::error::AppError;

#[async_trait]
impl CartRepository for MemoryStore {
    async fn cart_items(&self, user_id: i64) -> Result<Vec<CartItem>, AppError> {
        Ok(self
            .read()
            .cart_items
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_cart_item(&self, id: i64) -> Result<Option<CartItem>, AppError> {
        Ok(self.read().cart_items.get(&id).cloned())
    }

    /// Merge lookup and insert run under the same write lock, so two
    /// concurrent adds of the same line end up as one row.
    async fn add_cart_item(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i32,
        options: Value,
    ) -> Result<CartItem, AppError> {
        let mut tables = self.write();

        if let Some(existing) = tables
            .cart_items
            .values_mut()
            .find(|i| i.user_id == user_id && i.same_line(product_id, &options))
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return Ok(existing.clone());
        }

        let id = tables.ids.cart_items.next();
        let item = CartItem {
            id,
            user_id,
            product_id,
            quantity,
            options,
            added_at: Utc::now(),
        };
        tables.cart_items.insert(id, item.clone());
        Ok(item)
    }

    async fn set_cart_quantity(&self, id: i64, quantity: i32) -> Result<CartItem, AppError> {
        let mut tables = self.write();
        let item = tables
            .cart_items
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Cart item with id {} not found", id)))?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    async fn remove_cart_item(&self, id: i64) -> Result<(), AppError> {
        self.write()
            .cart_items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Cart item with id {} not found", id)))
    }

    async fn clear_cart(&self, user_id: i64) -> Result<(), AppError> {
        self.write().cart_items.retain(|_, i| i.user_id != user_id);
        Ok(())
    }
}
