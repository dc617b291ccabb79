//! Conversation and message entities and repository trait.
//!
//! A conversation is either bound to an order (buyer and seller) or a
//! standalone direct chat opened by a customer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A message thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    /// Set for order chats
    pub order_id: Option<i64>,
    /// The buyer of the order, or the user who opened the direct chat
    pub user_id: i64,
    pub is_direct: bool,
    pub created_at: DateTime<Utc>,
    /// Bumped whenever a message is appended
    pub updated_at: DateTime<Utc>,
}

/// Message content kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    /// Sender
    pub user_id: i64,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Stored for clients; nothing updates it server-side
    pub is_read: bool,
}

/// Fields required to append a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub user_id: i64,
    pub message_type: MessageType,
    pub content: String,
    pub image_url: Option<String>,
}

/// Repository trait for conversations and their messages.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create_conversation(
        &self,
        user_id: i64,
        order_id: Option<i64>,
        is_direct: bool,
    ) -> Result<Conversation, AppError>;

    async fn find_conversation(&self, id: i64) -> Result<Option<Conversation>, AppError>;

    async fn find_by_order(&self, order_id: i64) -> Result<Option<Conversation>, AppError>;

    /// The user's direct chat, created on first use. Lookup and insert share
    /// one write so a user never ends up with two.
    async fn direct_conversation(&self, user_id: i64) -> Result<Conversation, AppError>;

    /// The conversation bound to an order, created on first use for its owner.
    async fn order_conversation(&self, order_id: i64, owner_id: i64)
        -> Result<Conversation, AppError>;

    /// Conversations owned by a user, most recently active first.
    async fn conversations_for_user(&self, user_id: i64) -> Result<Vec<Conversation>, AppError>;

    /// Every conversation, most recently active first.
    async fn list_conversations(&self) -> Result<Vec<Conversation>, AppError>;

    /// Messages in creation order.
    async fn messages(&self, conversation_id: i64) -> Result<Vec<Message>, AppError>;

    /// Append a message and bump the conversation's `updated_at`.
    async fn append_message(&self, message: NewMessage) -> Result<Message, AppError>;
}
