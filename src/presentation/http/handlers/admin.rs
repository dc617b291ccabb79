//! Admin Handlers
//!
//! Catalog management, order status changes and the marketplace pipeline.
//! Every route here sits behind `auth_middleware` and `require_admin`.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::orders::notify_order_updated;
use crate::application::dto::request::{
    CreateCategoryRequest, CreateOptionRequest, CreateProductRequest, ImportRequest,
    UpdateOptionRequest, UpdateOrderStatusRequest, UpdateProductRequest,
};
use crate::application::services::{
    ImportReport, ListingsView, MarketplaceService, OrderService, ProductService, SyncReport,
};
use crate::domain::{Category, Order, Product, ProductOption};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    body.validate().map_err(validation_error)?;
    let product = state.product_service().create_product(body.into()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>, AppError> {
    body.validate().map_err(validation_error)?;
    Ok(Json(
        state
            .product_service()
            .update_product(product_id, body.into())
            .await?,
    ))
}

/// Delete a product and its options
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.product_service().delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_option(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(body): Json<CreateOptionRequest>,
) -> Result<(StatusCode, Json<ProductOption>), AppError> {
    body.validate().map_err(validation_error)?;
    let option = state
        .product_service()
        .add_option(product_id, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(option)))
}

pub async fn update_option(
    State(state): State<AppState>,
    Path(option_id): Path<i64>,
    Json(body): Json<UpdateOptionRequest>,
) -> Result<Json<ProductOption>, AppError> {
    body.validate().map_err(validation_error)?;
    Ok(Json(
        state
            .product_service()
            .update_option(option_id, body.into())
            .await?,
    ))
}

pub async fn delete_option(
    State(state): State<AppState>,
    Path(option_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.product_service().delete_option(option_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    body.validate().map_err(validation_error)?;
    let category = state
        .product_service()
        .create_category(body.name, body.slug, body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Move an order along its lifecycle and notify the buyer and admins
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(order_id): Path<i64>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .order_service()
        .update_status(order_id, body.status.trim())
        .await?;

    tracing::info!(
        admin_id = auth.user_id,
        order_id = order.id,
        status = %order.status,
        "Order status changed"
    );
    notify_order_updated(&state, &order).await;
    Ok(Json(order))
}

/// Fetch listings from eBay and overwrite the snapshot files
pub async fn marketplace_sync(State(state): State<AppState>) -> Result<Json<SyncReport>, AppError> {
    Ok(Json(state.marketplace_service().sync().await?))
}

/// Latest snapshot contents
pub async fn marketplace_listings(
    State(state): State<AppState>,
) -> Result<Json<ListingsView>, AppError> {
    Ok(Json(state.marketplace_service().listings().await?))
}

/// Import snapshot items into the catalog
pub async fn marketplace_import(
    State(state): State<AppState>,
    body: Option<Json<ImportRequest>>,
) -> Result<Json<ImportReport>, AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    Ok(Json(
        state
            .marketplace_service()
            .import(request.item_ids, request.category_id)
            .await?,
    ))
}
