//! Catalog Handlers (public)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::application::dto::request::{ProductQuery, QuoteRequest};
use crate::application::services::{ProductDetail, ProductService};
use crate::domain::{Category, PriceQuote, Product, ProductFilter};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.product_service().list_categories().await?))
}

/// `GET /api/products?category=&q=`
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = ProductFilter {
        category_id: query.category,
        search: query.q,
    };
    Ok(Json(state.product_service().list_products(filter).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<ProductDetail>, AppError> {
    Ok(Json(state.product_service().get_product(product_id).await?))
}

/// Price a configured sticker
pub async fn quote(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<PriceQuote>, AppError> {
    body.validate().map_err(validation_error)?;

    let quote = state
        .product_service()
        .quote(product_id, &body.options, body.quantity)
        .await?;
    Ok(Json(quote))
}
