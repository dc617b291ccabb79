//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod conversations;
pub mod health;
pub mod images;
pub mod orders;
