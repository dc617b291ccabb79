//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - In-memory store and the repository implementations on it
//! - Marketplace (eBay) listing sources and snapshot files
//! - Payment processor and image processing clients
//! - Prometheus metrics

pub mod images;
pub mod marketplace;
pub mod metrics;
pub mod payments;
pub mod repositories;
pub mod store;
