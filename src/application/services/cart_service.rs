//! Cart Service
//!
//! Per-user cart with line merging and live price quotes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{
    CartItem, CartRepository, PriceQuote, PriceTotals, PricingError, PricingService, Product,
    ProductRepository,
};
use crate::shared::error::AppError;

/// A cart row with its product and current price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: Product,
    /// `None` when the selection no longer prices (option removed or out of stock)
    pub quote: Option<PriceQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Cart contents and totals over the priced lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub totals: PriceTotals,
}

impl CartView {
    /// Whether every line can be checked out.
    pub fn is_priced(&self) -> bool {
        self.items.iter().all(|line| line.quote.is_some())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Cart item not found")]
    ItemNotFound,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound | CartError::ItemNotFound => AppError::NotFound(err.to_string()),
            CartError::Pricing(e) => AppError::BadRequest(e.to_string()),
            CartError::Store(e) => e,
        }
    }
}

/// Cart service trait
#[async_trait]
pub trait CartService: Send + Sync {
    async fn get_cart(&self, user_id: i64) -> Result<CartView, CartError>;

    /// Add a configured sticker; identical lines merge
    async fn add_item(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i32,
        options: Value,
    ) -> Result<CartItem, CartError>;

    /// Set a line's quantity; zero or less removes the line and returns `None`
    async fn update_quantity(
        &self,
        user_id: i64,
        item_id: i64,
        quantity: i32,
    ) -> Result<Option<CartItem>, CartError>;

    async fn remove_item(&self, user_id: i64, item_id: i64) -> Result<(), CartError>;

    async fn clear(&self, user_id: i64) -> Result<(), CartError>;
}

/// CartService implementation
pub struct CartServiceImpl<R>
where
    R: CartRepository + ProductRepository,
{
    repo: Arc<R>,
}

impl<R> CartServiceImpl<R>
where
    R: CartRepository + ProductRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Load a cart row, hiding rows of other users.
    async fn owned_item(&self, user_id: i64, item_id: i64) -> Result<CartItem, CartError> {
        self.repo
            .find_cart_item(item_id)
            .await?
            .filter(|item| item.user_id == user_id)
            .ok_or(CartError::ItemNotFound)
    }
}

#[async_trait]
impl<R> CartService for CartServiceImpl<R>
where
    R: CartRepository + ProductRepository + 'static,
{
    async fn get_cart(&self, user_id: i64) -> Result<CartView, CartError> {
        let mut lines = Vec::new();

        for item in self.repo.cart_items(user_id).await? {
            let Some(product) = self.repo.find_product(item.product_id).await? else {
                tracing::debug!(cart_item_id = item.id, product_id = item.product_id, "Skipping cart line for deleted product");
                continue;
            };
            let options = self.repo.options_for(product.id).await?;

            let (quote, error) =
                match PricingService::quote_selection(product.price, &options, &item.options, item.quantity) {
                    Ok(quote) => (Some(quote), None),
                    Err(e) => (None, Some(e.to_string())),
                };

            lines.push(CartLine {
                item,
                product,
                quote,
                error,
            });
        }

        let totals = PricingService::totals(lines.iter().filter_map(|l| l.quote.as_ref()));
        Ok(CartView { items: lines, totals })
    }

    async fn add_item(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i32,
        options: Value,
    ) -> Result<CartItem, CartError> {
        let product = self
            .repo
            .find_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;
        let product_options = self.repo.options_for(product_id).await?;

        // Reject selections that would not price at checkout
        PricingService::quote_selection(product.price, &product_options, &options, quantity)?;

        let item = self
            .repo
            .add_cart_item(user_id, product_id, quantity, options)
            .await?;

        tracing::debug!(user_id, cart_item_id = item.id, quantity = item.quantity, "Cart line added");
        Ok(item)
    }

    async fn update_quantity(
        &self,
        user_id: i64,
        item_id: i64,
        quantity: i32,
    ) -> Result<Option<CartItem>, CartError> {
        let item = self.owned_item(user_id, item_id).await?;

        if quantity <= 0 {
            self.repo.remove_cart_item(item.id).await?;
            return Ok(None);
        }

        Ok(Some(self.repo.set_cart_quantity(item.id, quantity).await?))
    }

    async fn remove_item(&self, user_id: i64, item_id: i64) -> Result<(), CartError> {
        let item = self.owned_item(user_id, item_id).await?;
        Ok(self.repo.remove_cart_item(item.id).await?)
    }

    async fn clear(&self, user_id: i64) -> Result<(), CartError> {
        Ok(self.repo.clear_cart(user_id).await?)
    }
}
