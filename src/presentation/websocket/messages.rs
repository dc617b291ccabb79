//! WebSocket Message Types
//!
//! JSON frames exchanged on `/ws`, tagged by `type`.

use serde::{Deserialize, Serialize};

use crate::domain::{Message, MessageType, Order, User};

/// Frames sent by the browser
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Must be the first frame on a connection
    Auth { token: String },

    /// Send a chat message
    #[serde(rename_all = "camelCase")]
    Message {
        conversation_id: i64,
        #[serde(default)]
        content: String,
        #[serde(default)]
        message_type: Option<MessageType>,
        #[serde(default)]
        image_url: Option<String>,
    },
}

/// Frames pushed to the browser
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Ready { user: User },
    AuthFailed { message: String },
    NewMessage { data: Message },
    OrderUpdated { data: Order },
    Error { message: String },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Event name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::AuthFailed { .. } => "auth_failed",
            Self::NewMessage { .. } => "new_message",
            Self::OrderUpdated { .. } => "order_updated",
            Self::Error { .. } => "error",
        }
    }
}
