//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::application::services::{CreateOptionDto, CreateProductDto, UpdateOptionDto, UpdateProductDto};

/// Registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(max = 64, message = "Display name must be at most 64 characters"))]
    pub display_name: Option<String>,
}

/// Login request; `username` may also be an email address
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request (refresh and logout)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Catalog query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Category id
    pub category: Option<i64>,
    /// Free-text search
    pub q: Option<String>,
}

/// Price quote request
#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    #[serde(default)]
    pub options: Value,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Add to cart request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: i64,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    #[serde(default)]
    pub options: Value,
}

/// Cart quantity change; zero or less removes the line
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// Checkout request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 1000, message = "Shipping address is required"))]
    pub shipping_address: String,

    pub payment_intent_id: Option<String>,
}

/// Chat message over REST
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    #[validate(length(max = 4000, message = "Message must be at most 4000 characters"))]
    pub content: String,

    /// `text` (default) or `image`
    pub message_type: Option<String>,

    pub image_url: Option<String>,
}

/// Background removal request; one of the two fields is required
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBackgroundRequest {
    pub image_url: Option<String>,
    pub image_data: Option<String>,
}

/// Create product request (admin)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image_url: String,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i64,

    pub category_id: Option<i64>,
}

impl From<CreateProductRequest> for CreateProductDto {
    fn from(req: CreateProductRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            price: req.price,
            category_id: req.category_id,
        }
    }
}

/// Update product request (admin)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,
    pub image_url: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: Option<i64>,

    pub category_id: Option<i64>,
}

impl From<UpdateProductRequest> for UpdateProductDto {
    fn from(req: UpdateProductRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            price: req.price,
            category_id: req.category_id,
        }
    }
}

fn default_in_stock() -> bool {
    true
}

/// Create option request (admin)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptionRequest {
    /// size, material, finish or shape
    pub option_type: String,

    #[validate(length(min = 1, max = 100, message = "Value must be 1-100 characters"))]
    pub value: String,

    #[serde(default)]
    pub price_modifier: i64,

    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

impl From<CreateOptionRequest> for CreateOptionDto {
    fn from(req: CreateOptionRequest) -> Self {
        Self {
            option_type: req.option_type,
            value: req.value,
            price_modifier: req.price_modifier,
            in_stock: req.in_stock,
        }
    }
}

/// Update option request (admin)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptionRequest {
    pub option_type: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Value must be 1-100 characters"))]
    pub value: Option<String>,

    pub price_modifier: Option<i64>,
    pub in_stock: Option<bool>,
}

impl From<UpdateOptionRequest> for UpdateOptionDto {
    fn from(req: UpdateOptionRequest) -> Self {
        Self {
            option_type: req.option_type,
            value: req.value,
            price_modifier: req.price_modifier,
            in_stock: req.in_stock,
        }
    }
}

/// Create category request (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Slug must be 1-100 characters"))]
    pub slug: String,

    pub description: Option<String>,
}

/// Order status change (admin)
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Marketplace import (admin); both fields optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub item_ids: Option<Vec<String>>,
    pub category_id: Option<i64>,
}
