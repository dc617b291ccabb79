//! # Domain Layer
//!
//! The domain layer contains the core business logic of the storefront.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (User, Product, Order, Conversation, etc.)
//! - **services**: Domain services for pure business rules (pricing)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate domain behavior

pub mod entities;
pub mod services;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
