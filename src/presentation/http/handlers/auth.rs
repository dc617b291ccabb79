//! Authentication Handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::application::dto::response::AuthResponse;
use crate::application::services::{AuthService, AuthTokens, Registration};
use crate::domain::User;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let registered = state
        .auth_service()
        .register(Registration {
            username: body.username.trim().to_string(),
            email: body.email.trim().to_string(),
            password: body.password,
            display_name: body.display_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::from(registered))))
}

/// Login with username (or email) and password
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let authenticated = state
        .auth_service()
        .authenticate(body.username.trim(), &body.password)
        .await?;

    Ok(Json(AuthResponse::from(authenticated)))
}

/// Refresh access token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<AuthTokens>, AppError> {
    let tokens = state.auth_service().refresh_token(&body.refresh_token).await?;
    Ok(Json(tokens))
}

/// Logout (revoke refresh token)
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> StatusCode {
    // Unknown tokens are already logged out
    if let Err(e) = state.auth_service().revoke_token(&body.refresh_token).await {
        tracing::debug!(error = %e, "Logout with unknown refresh token");
    }
    StatusCode::NO_CONTENT
}

/// Current user
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.auth_service().get_user(auth.user_id).await?))
}
