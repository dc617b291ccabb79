//! In-Memory Store
//!
//! A single process-lifetime object holding one `id -> entity` map per
//! table plus a monotonically increasing id counter per table. Nothing is
//! persisted; a restart resets every table (and reseeds, if configured).
//!
//! All repository traits of the domain layer are implemented on
//! [`MemoryStore`] in `infrastructure::repositories`.

mod seed;

use std::collections::BTreeMap;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::Serialize;

use crate::domain::{
    CartItem, Category, Conversation, Message, Order, OrderItem, Product, ProductOption, Session,
    User,
};

pub use seed::seed_sample_data;

/// Monotonic id source for one table. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct IdSequence(i64);

impl IdSequence {
    pub fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

/// One id counter per table.
#[derive(Debug, Default)]
pub struct IdCounters {
    pub users: IdSequence,
    pub categories: IdSequence,
    pub products: IdSequence,
    pub product_options: IdSequence,
    pub cart_items: IdSequence,
    pub orders: IdSequence,
    pub order_items: IdSequence,
    pub conversations: IdSequence,
    pub messages: IdSequence,
    pub sessions: IdSequence,
}

/// The tables. `BTreeMap` keeps iteration in id order.
#[derive(Debug, Default)]
pub struct Tables {
    pub users: BTreeMap<i64, User>,
    pub categories: BTreeMap<i64, Category>,
    pub products: BTreeMap<i64, Product>,
    pub product_options: BTreeMap<i64, ProductOption>,
    pub cart_items: BTreeMap<i64, CartItem>,
    pub orders: BTreeMap<i64, Order>,
    pub order_items: BTreeMap<i64, OrderItem>,
    pub conversations: BTreeMap<i64, Conversation>,
    pub messages: BTreeMap<i64, Message>,
    pub sessions: BTreeMap<i64, Session>,
    pub ids: IdCounters,
}

/// Row counts reported by the readiness probe.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub users: usize,
    pub products: usize,
    pub cart_items: usize,
    pub orders: usize,
    pub conversations: usize,
    pub messages: usize,
}

/// In-memory storage shared by every request handler.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared access to the tables.
    pub fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read()
    }

    /// Exclusive access to the tables. Keep the guard for the whole
    /// read-modify-write so concurrent requests cannot interleave.
    pub fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write()
    }

    pub fn counts(&self) -> StoreCounts {
        let tables = self.read();
        StoreCounts {
            users: tables.users.len(),
            products: tables.products.len(),
            cart_items: tables.cart_items.len(),
            orders: tables.orders.len(),
            conversations: tables.conversations.len(),
            messages: tables.messages.len(),
        }
    }
}
