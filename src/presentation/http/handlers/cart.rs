//! Cart Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::application::dto::request::{AddCartItemRequest, UpdateCartItemRequest};
use crate::application::services::{CartService, CartView};
use crate::domain::CartItem;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Lines with quotes and totals
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<CartView>, AppError> {
    Ok(Json(state.cart_service().get_cart(auth.user_id).await?))
}

/// Add a line; identical product and options merge into the existing line
pub async fn add_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<CartItem>), AppError> {
    body.validate().map_err(validation_error)?;

    let item = state
        .cart_service()
        .add_item(auth.user_id, body.product_id, body.quantity, body.options)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Set quantity; zero or less removes the line (204)
pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<i64>,
    Json(body): Json<UpdateCartItemRequest>,
) -> Result<Response, AppError> {
    let updated = state
        .cart_service()
        .update_quantity(auth.user_id, item_id, body.quantity)
        .await?;

    Ok(match updated {
        Some(item) => Json(item).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn remove_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.cart_service().remove_item(auth.user_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    state.cart_service().clear(auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
