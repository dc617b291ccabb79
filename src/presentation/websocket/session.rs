//! WebSocket Session Management

use std::sync::Arc;

use super::gateway::Connection;
use crate::domain::User;

/// An authenticated socket: who is on it and its registry entry.
/// Permissions are not cached here; each frame reloads the user.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub user_id: i64,
    pub username: String,
    pub connection: Arc<Connection>,
}

impl SessionState {
    pub fn new(user: &User, connection: Arc<Connection>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            connection,
        }
    }
}
