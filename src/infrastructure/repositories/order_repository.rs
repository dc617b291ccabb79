//! Order Repository Implementation

use async_trait::async_trait;
use chrono::Utc;

use super::conversation_repository::open_order_conversation;
use crate::domain::{
    ConsumedLine, NewOrder, NewOrderItem, Order, OrderItem, OrderRepository, OrderStatus,
    PlacedOrder,
};
use crate::infrastructure::store::{MemoryStore, Tables};
use crate::shared::error::AppError;

/// Newest first; ids break ties between orders created in the same instant.
fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

fn insert_order(
    tables: &mut Tables,
    order: NewOrder,
    items: Vec<NewOrderItem>,
) -> (Order, Vec<OrderItem>) {
    let order_id = tables.ids.orders.next();
    let now = Utc::now();
    let created = Order {
        id: order_id,
        user_id: order.user_id,
        status: order.status,
        total: order.total,
        shipping_address: order.shipping_address,
        payment_intent_id: order.payment_intent_id,
        created_at: now,
        updated_at: now,
    };
    tables.orders.insert(order_id, created.clone());

    let mut created_items = Vec::with_capacity(items.len());
    for item in items {
        let id = tables.ids.order_items.next();
        let row = OrderItem {
            id,
            order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            options: item.options,
            custom_design_url: item.custom_design_url,
        };
        tables.order_items.insert(id, row.clone());
        created_items.push(row);
    }

    (created, created_items)
}

/// Take `consumed` units out of each listed cart row of `user_id`. A row that
/// grew while the order was being priced keeps the difference.
fn consume_cart_lines(tables: &mut Tables, user_id: i64, consumed: &[ConsumedLine]) {
    for line in consumed {
        let Some(row) = tables.cart_items.get_mut(&line.cart_item_id) else {
            continue;
        };
        if row.user_id != user_id {
            continue;
        }
        if row.quantity > line.quantity {
            row.quantity -= line.quantity;
        } else {
            tables.cart_items.remove(&line.cart_item_id);
        }
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<(Order, Vec<OrderItem>), AppError> {
        Ok(insert_order(&mut self.write(), order, items))
    }

    async fn place_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
        consumed: &[ConsumedLine],
    ) -> Result<PlacedOrder, AppError> {
        let mut tables = self.write();

        if let Some(intent) = order.payment_intent_id.as_deref() {
            let used = tables
                .orders
                .values()
                .any(|o| o.payment_intent_id.as_deref() == Some(intent));
            if used {
                return Err(AppError::Conflict(
                    "Payment has already been used for another order".into(),
                ));
            }
        }

        let user_id = order.user_id;
        let (order, items) = insert_order(&mut tables, order, items);
        consume_cart_lines(&mut tables, user_id, consumed);
        let conversation = open_order_conversation(&mut tables, order.id, user_id);

        Ok(PlacedOrder {
            order,
            items,
            conversation,
        })
    }

    async fn find_order(&self, id: i64) -> Result<Option<Order>, AppError> {
        Ok(self.read().orders.get(&id).cloned())
    }

    async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .read()
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self.read().orders.values().cloned().collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, AppError> {
        Ok(self
            .read()
            .order_items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<Order, AppError> {
        let mut tables = self.write();
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Order with id {} not found", id)))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}
