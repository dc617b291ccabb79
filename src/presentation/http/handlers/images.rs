//! Image Processing Handler

use axum::{extract::State, Json};

use crate::application::dto::request::RemoveBackgroundRequest;
use crate::application::dto::response::ImageResponse;
use crate::infrastructure::images::{png_data_url, ImageError, ImageSource};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Forward an image to the background-removal processor
pub async fn remove_background(
    State(state): State<AppState>,
    Json(body): Json<RemoveBackgroundRequest>,
) -> Result<Json<ImageResponse>, AppError> {
    let processor = state
        .images
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Image processing is not configured".into()))?;

    let source = ImageSource::from_parts(body.image_url, body.image_data)
        .ok_or_else(|| AppError::BadRequest("imageUrl or imageData is required".into()))?;

    let bytes = processor.remove_background(&source).await.map_err(|e| match e {
        ImageError::Config(msg) => AppError::Internal(msg),
        e => AppError::Upstream(e.to_string()),
    })?;

    tracing::debug!(size = bytes.len(), "Background removed");
    Ok(Json(ImageResponse {
        image: png_data_url(&bytes),
    }))
}
