//! # Domain Services
//!
//! Domain services encapsulate business logic that doesn't naturally
//! belong to a single entity.
//!
//! ## Services
//!
//! - **PricingService**: Sticker price quotes (material multipliers,
//!   option modifiers, quantity discounts)

mod pricing_service;

pub use pricing_service::*;
