//! WebSocket Gateway
//!
//! Registry of open connections keyed by user id, best-effort fan-out and the
//! heartbeat sweeper.
//!
//! Delivery is fire-and-forget: users without an open connection are skipped
//! and nothing is queued for later.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::messages::ServerEvent;
use crate::infrastructure::metrics;

/// Work item for a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Serialized JSON frame
    Text(String),
    Ping,
    Close,
}

/// One open socket of a user
#[derive(Debug)]
pub struct Connection {
    id: Uuid,
    user_id: i64,
    alive: AtomicBool,
    sender: mpsc::UnboundedSender<Outbound>,
}

impl Connection {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Called on Pong
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Release);
    }

    /// Queue an event for this connection only.
    pub fn send(&self, event: &ServerEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(text) => self.sender.send(Outbound::Text(text)).is_ok(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize event");
                false
            }
        }
    }
}

/// WebSocket gateway managing all connections
#[derive(Debug, Default)]
pub struct Gateway {
    /// User ID to open connections (one user can have several tabs)
    connections: DashMap<i64, Vec<Arc<Connection>>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authenticated connection.
    pub fn register(&self, user_id: i64, sender: mpsc::UnboundedSender<Outbound>) -> Arc<Connection> {
        let connection = Arc::new(Connection {
            id: Uuid::new_v4(),
            user_id,
            alive: AtomicBool::new(true),
            sender,
        });

        self.connections
            .entry(user_id)
            .or_default()
            .push(connection.clone());

        tracing::info!(user_id, connection_id = %connection.id, "Connection registered");
        metrics::set_websocket_connections(self.connection_count());
        connection
    }

    /// Remove a connection; returns whether it was still registered.
    pub fn unregister(&self, user_id: i64, connection_id: Uuid) -> bool {
        let removed = match self.connections.get_mut(&user_id) {
            Some(mut list) => {
                let before = list.len();
                list.retain(|c| c.id != connection_id);
                list.len() != before
            }
            None => false,
        };
        self.connections.remove_if(&user_id, |_, list| list.is_empty());

        if removed {
            tracing::info!(user_id, connection_id = %connection_id, "Connection unregistered");
            metrics::set_websocket_connections(self.connection_count());
        }
        removed
    }

    /// Push an event to every open connection of the given users.
    ///
    /// Returns the number of connections the frame was queued on.
    pub fn send_to_users(&self, user_ids: &[i64], event: &ServerEvent) -> usize {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, event = event.kind(), "Failed to serialize event");
                return 0;
            }
        };

        let mut delivered = 0;
        for user_id in user_ids {
            let Some(list) = self.connections.get(user_id) else {
                continue;
            };
            for connection in list.iter() {
                if connection.sender.send(Outbound::Text(text.clone())).is_ok() {
                    delivered += 1;
                }
            }
        }

        tracing::debug!(event = event.kind(), recipients = user_ids.len(), delivered, "Event fanned out");
        delivered
    }

    /// One heartbeat round.
    ///
    /// Connections that did not answer the previous Ping are closed and
    /// dropped; every other connection is marked not-alive and pinged.
    /// Returns the number of dropped connections.
    pub fn sweep(&self) -> usize {
        let mut dead = Vec::new();

        for entry in self.connections.iter() {
            for connection in entry.value() {
                let was_alive = connection.alive.swap(false, Ordering::AcqRel);
                if !was_alive || connection.sender.send(Outbound::Ping).is_err() {
                    dead.push((connection.user_id, connection.id, connection.sender.clone()));
                }
            }
        }

        for (user_id, connection_id, sender) in &dead {
            let _ = sender.send(Outbound::Close);
            self.unregister(*user_id, *connection_id);
            tracing::info!(user_id, connection_id = %connection_id, "Dropped unresponsive connection");
        }

        dead.len()
    }

    /// Run [`Gateway::sweep`] every `interval` until the task is aborted.
    pub fn spawn_heartbeat(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let gateway = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                gateway.sweep();
            }
        })
    }

    /// Total open connections
    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if user has at least one open connection
    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.connections
            .get(&user_id)
            .map(|list| !list.is_empty())
            .unwrap_or(false)
    }
}
