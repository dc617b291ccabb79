//! Chat Service
//!
//! Conversations, message history and message sending. Sending returns the
//! notify-set; pushing to open sockets is the gateway's job.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    Conversation, ConversationRepository, Message, MessageType, NewMessage, OrderRepository,
    UserRepository,
};
use crate::shared::error::AppError;

/// Conversation with its latest message, for conversation lists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub last_message: Option<Message>,
}

/// A message to send.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub conversation_id: i64,
    pub content: String,
    pub message_type: MessageType,
    pub image_url: Option<String>,
}

/// A persisted message and the users who should see it live.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: Message,
    /// Sender, conversation owner and every admin; sorted, no duplicates
    pub recipients: Vec<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("Not a participant of this conversation")]
    Forbidden,

    #[error("Message content is empty")]
    EmptyMessage,

    #[error("Image messages require an image URL")]
    MissingImageUrl,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::ConversationNotFound => AppError::NotFound(err.to_string()),
            ChatError::Forbidden => AppError::Forbidden(err.to_string()),
            ChatError::Store(e) => e,
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

/// Chat service trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Own conversations; admins see every conversation
    async fn list_conversations(&self, user_id: i64, is_admin: bool) -> Result<Vec<ConversationSummary>, ChatError>;

    /// Get or create the caller's direct chat
    async fn direct_conversation(&self, user_id: i64) -> Result<Conversation, ChatError>;

    async fn messages(&self, user_id: i64, is_admin: bool, conversation_id: i64) -> Result<Vec<Message>, ChatError>;

    /// Persist a message and compute who to notify
    async fn send_message(&self, user_id: i64, is_admin: bool, message: OutgoingMessage) -> Result<Delivery, ChatError>;
}

/// ChatService implementation
pub struct ChatServiceImpl<R>
where
    R: ConversationRepository + OrderRepository + UserRepository,
{
    repo: Arc<R>,
}

impl<R> ChatServiceImpl<R>
where
    R: ConversationRepository + OrderRepository + UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// The buyer for order chats, otherwise whoever opened the chat.
    async fn owner_of(&self, conversation: &Conversation) -> Result<i64, ChatError> {
        if let Some(order_id) = conversation.order_id {
            if let Some(order) = self.repo.find_order(order_id).await? {
                return Ok(order.user_id);
            }
        }
        Ok(conversation.user_id)
    }

    async fn accessible(&self, user_id: i64, is_admin: bool, conversation_id: i64) -> Result<Conversation, ChatError> {
        let conversation = self
            .repo
            .find_conversation(conversation_id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        if !is_admin && self.owner_of(&conversation).await? != user_id {
            return Err(ChatError::Forbidden);
        }
        Ok(conversation)
    }
}

#[async_trait]
impl<R> ChatService for ChatServiceImpl<R>
where
    R: ConversationRepository + OrderRepository + UserRepository + 'static,
{
    async fn list_conversations(&self, user_id: i64, is_admin: bool) -> Result<Vec<ConversationSummary>, ChatError> {
        let conversations = if is_admin {
            self.repo.list_conversations().await?
        } else {
            self.repo.conversations_for_user(user_id).await?
        };

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let last_message = self.repo.messages(conversation.id).await?.pop();
            summaries.push(ConversationSummary {
                conversation,
                last_message,
            });
        }
        Ok(summaries)
    }

    async fn direct_conversation(&self, user_id: i64) -> Result<Conversation, ChatError> {
        let conversation = self.repo.direct_conversation(user_id).await?;
        tracing::debug!(user_id, conversation_id = conversation.id, "Direct chat resolved");
        Ok(conversation)
    }

    async fn messages(&self, user_id: i64, is_admin: bool, conversation_id: i64) -> Result<Vec<Message>, ChatError> {
        let conversation = self.accessible(user_id, is_admin, conversation_id).await?;
        Ok(self.repo.messages(conversation.id).await?)
    }

    async fn send_message(&self, user_id: i64, is_admin: bool, message: OutgoingMessage) -> Result<Delivery, ChatError> {
        let image_url = message.image_url.filter(|u| !u.trim().is_empty());
        let content = message.content.trim().to_string();

        match message.message_type {
            MessageType::Image if image_url.is_none() => return Err(ChatError::MissingImageUrl),
            MessageType::Text if content.is_empty() => return Err(ChatError::EmptyMessage),
            _ => {}
        }

        let conversation = self
            .accessible(user_id, is_admin, message.conversation_id)
            .await?;
        let owner = self.owner_of(&conversation).await?;

        let stored = self
            .repo
            .append_message(NewMessage {
                conversation_id: conversation.id,
                user_id,
                message_type: message.message_type,
                content,
                image_url,
            })
            .await?;

        let mut recipients: BTreeSet<i64> = self.repo.admin_ids().await?.into_iter().collect();
        recipients.insert(user_id);
        recipients.insert(owner);

        Ok(Delivery {
            message: stored,
            recipients: recipients.into_iter().collect(),
        })
    }
}
