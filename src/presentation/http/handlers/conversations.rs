//! Conversation Handlers
//!
//! REST twin of the socket chat path: sending here persists and fans out
//! exactly like a `message` frame.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::SendMessageRequest;
use crate::application::services::{ChatService, ConversationSummary, OutgoingMessage};
use crate::domain::{Conversation, Message, MessageType};
use crate::presentation::middleware::AuthUser;
use crate::presentation::websocket::broadcast_message;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Own conversations; admins see all
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ConversationSummary>>, AppError> {
    Ok(Json(
        state
            .chat_service()
            .list_conversations(auth.user_id, auth.is_admin)
            .await?,
    ))
}

/// Get or create the caller's direct chat
pub async fn direct_conversation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Conversation>, AppError> {
    Ok(Json(state.chat_service().direct_conversation(auth.user_id).await?))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(conversation_id): Path<i64>,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(
        state
            .chat_service()
            .messages(auth.user_id, auth.is_admin, conversation_id)
            .await?,
    ))
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(conversation_id): Path<i64>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    body.validate().map_err(validation_error)?;

    let message_type = match body.message_type.as_deref() {
        None | Some("text") => MessageType::Text,
        Some("image") => MessageType::Image,
        Some(other) => {
            return Err(AppError::BadRequest(format!("Unknown message type: {}", other)))
        }
    };

    let delivery = state
        .chat_service()
        .send_message(
            auth.user_id,
            auth.is_admin,
            OutgoingMessage {
                conversation_id,
                content: body.content,
                message_type,
                image_url: body.image_url,
            },
        )
        .await?;

    let message = delivery.message.clone();
    broadcast_message(&state.gateway, delivery, "http");

    Ok((StatusCode::CREATED, Json(message)))
}
