//! Catalog entities: categories, products and product options.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A product category shown in the shop navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// URL slug (unique)
    pub slug: String,
    pub description: Option<String>,
}

/// A sticker product.
///
/// Prices are integer cents. `external_id` is the marketplace item id of
/// products created by a marketplace import; re-imports update in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Base price in cents
    pub price: i64,
    pub category_id: Option<i64>,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: i64,
    pub category_id: Option<i64>,
    pub external_id: Option<String>,
}

/// Kinds of selectable options on a sticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Size,
    Material,
    Finish,
    Shape,
}

impl OptionType {
    pub const ALL: [OptionType; 4] = [
        OptionType::Size,
        OptionType::Material,
        OptionType::Finish,
        OptionType::Shape,
    ];

    /// Parse the lowercase wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "size" => Some(Self::Size),
            "material" => Some(Self::Material),
            "finish" => Some(Self::Finish),
            "shape" => Some(Self::Shape),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Material => "material",
            Self::Finish => "finish",
            Self::Shape => "shape",
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One selectable value of a product option, e.g. material = holographic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub id: i64,
    pub product_id: i64,
    pub option_type: OptionType,
    pub value: String,
    /// Price delta in cents (may be negative)
    pub price_modifier: i64,
    pub in_stock: bool,
}

/// Fields required to insert a product option.
#[derive(Debug, Clone)]
pub struct NewProductOption {
    pub product_id: i64,
    pub option_type: OptionType,
    pub value: String,
    pub price_modifier: i64,
    pub in_stock: bool,
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    /// Case-insensitive match against title and description
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = self.category_id {
            if product.category_id != Some(category_id) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                product.title.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

/// Repository trait for categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError>;

    /// Create a category; fails with `Conflict` on a duplicate slug.
    async fn create_category(
        &self,
        name: String,
        slug: String,
        description: Option<String>,
    ) -> Result<Category, AppError>;
}

/// Repository trait for products and their options.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List products matching the filter, ordered by ID.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError>;

    async fn find_product(&self, id: i64) -> Result<Option<Product>, AppError>;

    /// Find the product imported from a marketplace item.
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Product>, AppError>;

    async fn create_product(&self, product: NewProduct) -> Result<Product, AppError>;

    /// Replace a product's mutable fields; bumps `updated_at`.
    async fn update_product(&self, product: &Product) -> Result<Product, AppError>;

    /// Delete a product and all of its options.
    async fn delete_product(&self, id: i64) -> Result<(), AppError>;

    /// Options of a product, ordered by ID.
    async fn options_for(&self, product_id: i64) -> Result<Vec<ProductOption>, AppError>;

    async fn find_option(&self, id: i64) -> Result<Option<ProductOption>, AppError>;

    async fn create_option(&self, option: NewProductOption) -> Result<ProductOption, AppError>;

    async fn update_option(&self, option: &ProductOption) -> Result<ProductOption, AppError>;

    async fn delete_option(&self, id: i64) -> Result<(), AppError>;
}
