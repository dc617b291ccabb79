//! Refresh-token session entity and repository trait.
//!
//! Only the SHA-256 digest of a refresh token is ever stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::error::AppError;

/// A refresh-token session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Store-assigned ID
    pub id: i64,

    /// User this session belongs to
    pub user_id: i64,

    /// SHA-256 hash of the refresh token (never store raw tokens)
    pub refresh_token_hash: String,

    /// When this session expires
    pub expires_at: DateTime<Utc>,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session was revoked (None if active)
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Check if the session is currently active (not expired, not revoked).
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Repository trait for Session data access operations.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session for a hashed refresh token.
    async fn create_session(
        &self,
        user_id: i64,
        refresh_token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, AppError>;

    /// Find a session by refresh token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// Replace the token hash and expiry (refresh token rotation).
    async fn rotate(
        &self,
        id: i64,
        new_token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Revoke a session (set revoked_at).
    async fn revoke(&self, id: i64) -> Result<(), AppError>;
}
