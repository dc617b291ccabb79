//! User entity and repository trait.
//!
//! Held in the `users` table of the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a storefront account (customer or admin).
///
/// Fields:
/// - id: store-assigned, monotonically increasing
/// - username: unique, used to log in
/// - email: unique
/// - password_hash: Argon2 PHC string
/// - display_name: optional name shown in chat
/// - is_admin: admins manage the catalog, orders and marketplace sync
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned ID (primary key)
    pub id: i64,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Display name (optional, up to 64 characters)
    pub display_name: Option<String>,

    /// Whether the user has access to the admin dashboard
    pub is_admin: bool,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Get the display name, falling back to username if not set.
    pub fn display_name_or_username(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Fields required to insert a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

/// Repository trait for User data access operations.
///
/// The trait is defined in the domain layer to maintain dependency inversion.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Find a user by email address (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Create a new user.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    /// Check if username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Check if email is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// IDs of every admin account.
    async fn admin_ids(&self) -> Result<Vec<i64>, AppError>;

    /// All users ordered by ID.
    async fn list(&self) -> Result<Vec<User>, AppError>;
}
