//! User Repository Implementation
//!
//! In-memory implementation of user and account lookups. Usernames and
//! emails are unique case-insensitively.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{NewUser, User, UserRepository};
use crate::infrastructure::store::MemoryStore;
use crate::shared::error::AppError;

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.read().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .read()
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .read()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    /// Create a new user.
    ///
    /// The uniqueness check and the insert share one write lock.
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.write();

        let taken = tables.users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&user.username) || u.email.eq_ignore_ascii_case(&user.email)
        });
        if taken {
            return Err(AppError::Conflict(
                "User with this email or username already exists".to_string(),
            ));
        }

        let id = tables.ids.users.next();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            display_name: user.display_name,
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());

        Ok(created)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn admin_ids(&self) -> Result<Vec<i64>, AppError> {
        Ok(self
            .read()
            .users
            .values()
            .filter(|u| u.is_admin)
            .map(|u| u.id)
            .collect())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.read().users.values().cloned().collect())
    }
}
