//! Presentation Layer
//!
//! HTTP routes, middleware and the WebSocket chat gateway.

pub mod http;
pub mod middleware;
pub mod websocket;
