//! Conversation Repository Implementation

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Conversation, ConversationRepository, Message, NewMessage};
use crate::infrastructure::store::{MemoryStore, Tables};
use crate::shared::error::AppError;

fn insert_conversation(
    tables: &mut Tables,
    user_id: i64,
    order_id: Option<i64>,
    is_direct: bool,
) -> Conversation {
    let id = tables.ids.conversations.next();
    let now = Utc::now();
    let conversation = Conversation {
        id,
        order_id,
        user_id,
        is_direct,
        created_at: now,
        updated_at: now,
    };
    tables.conversations.insert(id, conversation.clone());
    conversation
}

/// Existing conversation of an order, or a new one owned by `owner_id`.
/// Callers hold the write guard across lookup and insert.
pub(super) fn open_order_conversation(
    tables: &mut Tables,
    order_id: i64,
    owner_id: i64,
) -> Conversation {
    let existing = tables
        .conversations
        .values()
        .find(|c| c.order_id == Some(order_id))
        .cloned();
    existing.unwrap_or_else(|| insert_conversation(tables, owner_id, Some(order_id), false))
}

fn most_recent_first(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn create_conversation(
        &self,
        user_id: i64,
        order_id: Option<i64>,
        is_direct: bool,
    ) -> Result<Conversation, AppError> {
        Ok(insert_conversation(&mut self.write(), user_id, order_id, is_direct))
    }

    async fn find_conversation(&self, id: i64) -> Result<Option<Conversation>, AppError> {
        Ok(self.read().conversations.get(&id).cloned())
    }

    async fn find_by_order(&self, order_id: i64) -> Result<Option<Conversation>, AppError> {
        Ok(self
            .read()
            .conversations
            .values()
            .find(|c| c.order_id == Some(order_id))
            .cloned())
    }

    async fn direct_conversation(&self, user_id: i64) -> Result<Conversation, AppError> {
        let mut tables = self.write();
        let existing = tables
            .conversations
            .values()
            .find(|c| c.is_direct && c.user_id == user_id)
            .cloned();
        Ok(existing.unwrap_or_else(|| insert_conversation(&mut tables, user_id, None, true)))
    }

    async fn order_conversation(
        &self,
        order_id: i64,
        owner_id: i64,
    ) -> Result<Conversation, AppError> {
        Ok(open_order_conversation(&mut self.write(), order_id, owner_id))
    }

    async fn conversations_for_user(&self, user_id: i64) -> Result<Vec<Conversation>, AppError> {
        let mut conversations: Vec<Conversation> = self
            .read()
            .conversations
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        most_recent_first(&mut conversations);
        Ok(conversations)
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, AppError> {
        let mut conversations: Vec<Conversation> =
            self.read().conversations.values().cloned().collect();
        most_recent_first(&mut conversations);
        Ok(conversations)
    }

    async fn messages(&self, conversation_id: i64) -> Result<Vec<Message>, AppError> {
        Ok(self
            .read()
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message, AppError> {
        let mut tables = self.write();
        let now = Utc::now();

        let conversation = tables
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Conversation with id {} not found",
                    message.conversation_id
                ))
            })?;
        conversation.updated_at = now;

        let id = tables.ids.messages.next();
        let created = Message {
            id,
            conversation_id: message.conversation_id,
            user_id: message.user_id,
            message_type: message.message_type,
            content: message.content,
            image_url: message.image_url,
            created_at: now,
            is_read: false,
        };
        tables.messages.insert(id, created.clone());
        Ok(created)
    }
}
