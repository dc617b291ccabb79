//! # Sticker Shop Library
//!
//! Backend for a custom sticker storefront:
//! - RESTful HTTP API for the catalog, cart, checkout, orders and admin tools
//! - WebSocket chat between buyers and the shop with best-effort fan-out
//! - In-memory store, reseeded on every start
//! - eBay listing sync with JSON/CSV snapshots, Stripe payment intents and a
//!   background-removal image proxy
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities, repository traits and pricing
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Store, marketplace, payment and image clients
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! sticker_shop/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, pricing and repository traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Store and external service clients
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Common utilities (errors, passwords, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
