//! WebSocket Gateway
//!
//! Real-time chat delivery via WebSocket connections.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod session;

pub use gateway::{Connection, Gateway, Outbound};
pub use handler::{broadcast_message, handle_frame, ws_handler};
pub use messages::{ClientFrame, ServerEvent};
pub use session::SessionState;
