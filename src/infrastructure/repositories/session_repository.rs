//! Session Repository Implementation
//!
//! Refresh-token sessions keyed by the SHA-256 hash of the token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Session, SessionRepository};
use crate::infrastructure::store::MemoryStore;
use crate::shared::error::AppError;

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create_session(
        &self,
        user_id: i64,
        refresh_token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, AppError> {
        let mut tables = self.write();
        let id = tables.ids.sessions.next();
        let session = Session {
            id,
            user_id,
            refresh_token_hash,
            expires_at,
            created_at: Utc::now(),
            revoked_at: None,
        };
        tables.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        Ok(self
            .read()
            .sessions
            .values()
            .find(|s| s.refresh_token_hash == token_hash)
            .cloned())
    }

    async fn rotate(
        &self,
        id: i64,
        new_token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tables = self.write();
        let session = tables
            .sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session with id {} not found", id)))?;
        session.refresh_token_hash = new_token_hash;
        session.expires_at = expires_at;
        Ok(())
    }

    async fn revoke(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.write();
        let session = tables
            .sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session with id {} not found", id)))?;
        if session.revoked_at.is_none() {
            session.revoked_at = Some(Utc::now());
        }
        Ok(())
    }
}
