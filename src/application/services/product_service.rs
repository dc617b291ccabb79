//! Product Service
//!
//! Catalog browsing, price quotes and admin catalog management.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{
    Category, CategoryRepository, NewProduct, NewProductOption, OptionType, PriceQuote,
    PricingError, PricingService, Product, ProductFilter, ProductOption, ProductRepository,
};
use crate::shared::error::AppError;

/// Product with its options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub options: Vec<ProductOption>,
}

/// Fields for a new product.
#[derive(Debug, Clone)]
pub struct CreateProductDto {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: i64,
    pub category_id: Option<i64>,
}

/// Partial product update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<i64>,
}

/// Fields for a new option.
#[derive(Debug, Clone)]
pub struct CreateOptionDto {
    pub option_type: String,
    pub value: String,
    pub price_modifier: i64,
    pub in_stock: bool,
}

/// Partial option update.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptionDto {
    pub option_type: Option<String>,
    pub value: Option<String>,
    pub price_modifier: Option<i64>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Option not found")]
    OptionNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Unknown option type: {0}")]
    InvalidOptionType(String),

    #[error("Price must not be negative")]
    NegativePrice,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::ProductNotFound
            | ProductError::OptionNotFound
            | ProductError::CategoryNotFound => AppError::NotFound(err.to_string()),
            ProductError::Store(e) => e,
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

/// Product service trait
#[async_trait]
pub trait ProductService: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ProductError>;

    async fn create_category(
        &self,
        name: String,
        slug: String,
        description: Option<String>,
    ) -> Result<Category, ProductError>;

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, ProductError>;

    async fn get_product(&self, id: i64) -> Result<ProductDetail, ProductError>;

    /// Price a configured sticker without touching the cart
    async fn quote(&self, product_id: i64, selection: &Value, quantity: i32) -> Result<PriceQuote, ProductError>;

    async fn create_product(&self, dto: CreateProductDto) -> Result<Product, ProductError>;

    async fn update_product(&self, id: i64, dto: UpdateProductDto) -> Result<Product, ProductError>;

    async fn delete_product(&self, id: i64) -> Result<(), ProductError>;

    async fn add_option(&self, product_id: i64, dto: CreateOptionDto) -> Result<ProductOption, ProductError>;

    async fn update_option(&self, id: i64, dto: UpdateOptionDto) -> Result<ProductOption, ProductError>;

    async fn delete_option(&self, id: i64) -> Result<(), ProductError>;
}

/// ProductService implementation
pub struct ProductServiceImpl<R>
where
    R: ProductRepository + CategoryRepository,
{
    repo: Arc<R>,
}

impl<R> ProductServiceImpl<R>
where
    R: ProductRepository + CategoryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn ensure_category(&self, category_id: Option<i64>) -> Result<(), ProductError> {
        if let Some(id) = category_id {
            self.repo
                .find_category(id)
                .await?
                .ok_or(ProductError::CategoryNotFound)?;
        }
        Ok(())
    }

    async fn load_product(&self, id: i64) -> Result<Product, ProductError> {
        self.repo
            .find_product(id)
            .await?
            .ok_or(ProductError::ProductNotFound)
    }
}

fn parse_option_type(s: &str) -> Result<OptionType, ProductError> {
    OptionType::parse(&s.trim().to_lowercase()).ok_or_else(|| ProductError::InvalidOptionType(s.to_string()))
}

#[async_trait]
impl<R> ProductService for ProductServiceImpl<R>
where
    R: ProductRepository + CategoryRepository + 'static,
{
    async fn list_categories(&self) -> Result<Vec<Category>, ProductError> {
        Ok(self.repo.list_categories().await?)
    }

    async fn create_category(
        &self,
        name: String,
        slug: String,
        description: Option<String>,
    ) -> Result<Category, ProductError> {
        let slug = slug.trim().to_lowercase();
        Ok(self.repo.create_category(name, slug, description).await?)
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, ProductError> {
        Ok(self.repo.list_products(&filter).await?)
    }

    async fn get_product(&self, id: i64) -> Result<ProductDetail, ProductError> {
        let product = self.load_product(id).await?;
        let options = self.repo.options_for(id).await?;
        Ok(ProductDetail { product, options })
    }

    async fn quote(&self, product_id: i64, selection: &Value, quantity: i32) -> Result<PriceQuote, ProductError> {
        let product = self.load_product(product_id).await?;
        let options = self.repo.options_for(product_id).await?;
        Ok(PricingService::quote_selection(product.price, &options, selection, quantity)?)
    }

    async fn create_product(&self, dto: CreateProductDto) -> Result<Product, ProductError> {
        if dto.price < 0 {
            return Err(ProductError::NegativePrice);
        }
        self.ensure_category(dto.category_id).await?;

        let product = self
            .repo
            .create_product(NewProduct {
                title: dto.title,
                description: dto.description,
                image_url: dto.image_url,
                price: dto.price,
                category_id: dto.category_id,
                external_id: None,
            })
            .await?;

        tracing::info!(product_id = product.id, title = %product.title, "Product created");
        Ok(product)
    }

    async fn update_product(&self, id: i64, dto: UpdateProductDto) -> Result<Product, ProductError> {
        let mut product = self.load_product(id).await?;

        if let Some(price) = dto.price {
            if price < 0 {
                return Err(ProductError::NegativePrice);
            }
            product.price = price;
        }
        if dto.category_id.is_some() {
            self.ensure_category(dto.category_id).await?;
            product.category_id = dto.category_id;
        }
        if let Some(title) = dto.title {
            product.title = title;
        }
        if let Some(description) = dto.description {
            product.description = description;
        }
        if let Some(image_url) = dto.image_url {
            product.image_url = image_url;
        }

        Ok(self.repo.update_product(&product).await?)
    }

    async fn delete_product(&self, id: i64) -> Result<(), ProductError> {
        self.load_product(id).await?;
        self.repo.delete_product(id).await?;
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }

    async fn add_option(&self, product_id: i64, dto: CreateOptionDto) -> Result<ProductOption, ProductError> {
        self.load_product(product_id).await?;
        let option_type = parse_option_type(&dto.option_type)?;

        Ok(self
            .repo
            .create_option(NewProductOption {
                product_id,
                option_type,
                value: dto.value,
                price_modifier: dto.price_modifier,
                in_stock: dto.in_stock,
            })
            .await?)
    }

    async fn update_option(&self, id: i64, dto: UpdateOptionDto) -> Result<ProductOption, ProductError> {
        let mut option = self
            .repo
            .find_option(id)
            .await?
            .ok_or(ProductError::OptionNotFound)?;

        if let Some(option_type) = dto.option_type {
            option.option_type = parse_option_type(&option_type)?;
        }
        if let Some(value) = dto.value {
            option.value = value;
        }
        if let Some(price_modifier) = dto.price_modifier {
            option.price_modifier = price_modifier;
        }
        if let Some(in_stock) = dto.in_stock {
            option.in_stock = in_stock;
        }

        Ok(self.repo.update_option(&option).await?)
    }

    async fn delete_option(&self, id: i64) -> Result<(), ProductError> {
        self.repo
            .find_option(id)
            .await?
            .ok_or(ProductError::OptionNotFound)?;
        Ok(self.repo.delete_option(id).await?)
    }
}
