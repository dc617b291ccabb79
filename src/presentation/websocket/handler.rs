//! WebSocket Connection Handler
//!
//! Protocol: the first frame must be `{"type":"auth","token":...}` within the
//! auth timeout. After `ready`, `message` frames are persisted and fanned out
//! to the notify-set; failures go back to the sending socket only.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::SplitStream, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::gateway::{Gateway, Outbound};
use super::messages::{ClientFrame, ServerEvent};
use super::session::SessionState;
use crate::application::services::{AuthService, ChatService, Delivery, OutgoingMessage};
use crate::domain::User;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let max_size = state.settings.websocket.max_message_size;
    ws.max_message_size(max_size)
        .max_frame_size(max_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Push a stored message to everyone in its notify-set.
pub fn broadcast_message(gateway: &Gateway, delivery: Delivery, via: &'static str) {
    metrics::record_chat_message(via);
    gateway.send_to_users(
        &delivery.recipients,
        &ServerEvent::NewMessage {
            data: delivery.message,
        },
    );
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();

    // Writer task: the only place that touches the sink
    let mut writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let frame = match outbound {
                Outbound::Text(text) => Message::Text(text.into()),
                Outbound::Ping => Message::Ping(axum::body::Bytes::new()),
                Outbound::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            };
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    let auth_timeout = Duration::from_secs(state.settings.websocket.auth_timeout_secs);
    let user = match timeout(auth_timeout, authenticate(&mut receiver, &state)).await {
        Ok(Ok(user)) => user,
        Ok(Err(reason)) => {
            reject(&tx, reason);
            drop(tx);
            let _ = writer.await;
            return;
        }
        Err(_) => {
            reject(&tx, "Authentication timed out".into());
            drop(tx);
            let _ = writer.await;
            return;
        }
    };

    let connection = state.gateway.register(user.id, tx.clone());
    let session = SessionState::new(&user, connection);
    session.connection.send(&ServerEvent::Ready { user });

    tracing::info!(user_id = session.user_id, username = %session.username, "User connected");

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(text.as_str(), &session, &state).await;
                    }
                    Some(Ok(Message::Pong(_))) => session.connection.mark_alive(),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(user_id = session.user_id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
            // Writer stopped: closed by the sweeper or the peer went away
            _ = &mut writer => break,
        }
    }

    state
        .gateway
        .unregister(session.user_id, session.connection.id());
    writer.abort();

    tracing::info!(user_id = session.user_id, "User disconnected");
}

fn reject(tx: &mpsc::UnboundedSender<Outbound>, message: String) {
    tracing::debug!(reason = %message, "WebSocket authentication failed");
    if let Ok(text) = serde_json::to_string(&ServerEvent::AuthFailed { message }) {
        let _ = tx.send(Outbound::Text(text));
    }
    let _ = tx.send(Outbound::Close);
}

/// Wait for the auth frame and resolve its user.
async fn authenticate(
    receiver: &mut SplitStream<WebSocket>,
    state: &AppState,
) -> Result<User, String> {
    let token = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientFrame>(text.as_str()) {
                Ok(ClientFrame::Auth { token }) => break token,
                Ok(_) => return Err("First frame must be an auth frame".into()),
                Err(e) => return Err(format!("Invalid frame: {}", e)),
            },
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                return Err("Connection closed before authentication".into())
            }
            Some(Ok(_)) => continue,
        }
    };

    let auth = state.auth_service();
    let user_id = auth.validate_token(&token).map_err(|e| e.to_string())?;
    auth.get_user(user_id).await.map_err(|e| e.to_string())
}

/// Handle one text frame from an authenticated socket.
pub async fn handle_frame(text: &str, session: &SessionState, state: &AppState) {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            session
                .connection
                .send(&ServerEvent::error(format!("Invalid frame: {}", e)));
            return;
        }
    };

    match frame {
        ClientFrame::Auth { .. } => {
            session.connection.send(&ServerEvent::error("Already authenticated"));
        }
        ClientFrame::Message {
            conversation_id,
            content,
            message_type,
            image_url,
        } => {
            // The admin flag may have changed since the socket authenticated
            let sender = match state.auth_service().get_user(session.user_id).await {
                Ok(user) => user,
                Err(e) => {
                    let error = AppError::from(e);
                    tracing::debug!(user_id = session.user_id, error = %error, "Sender lookup failed");
                    session.connection.send(&ServerEvent::error(error.to_string()));
                    return;
                }
            };
            let outgoing = OutgoingMessage {
                conversation_id,
                content,
                message_type: message_type.unwrap_or_default(),
                image_url,
            };
            match state
                .chat_service()
                .send_message(sender.id, sender.is_admin, outgoing)
                .await
            {
                Ok(delivery) => broadcast_message(&state.gateway, delivery, "websocket"),
                Err(e) => {
                    let error = AppError::from(e);
                    tracing::debug!(user_id = session.user_id, error = %error, "Chat message rejected");
                    session.connection.send(&ServerEvent::error(error.to_string()));
                }
            }
        }
    }
}
