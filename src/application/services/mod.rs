//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT tokens and refresh rotation
//! - **ProductService**: Catalog browsing, quotes and admin catalog management
//! - **CartService**: Per-user cart with live pricing
//! - **OrderService**: Checkout, payment intents and the order lifecycle
//! - **ChatService**: Order and direct conversations
//! - **MarketplaceService**: eBay sync, snapshots and catalog import

pub mod auth_service;
pub mod cart_service;
pub mod chat_service;
pub mod marketplace_service;
pub mod order_service;
pub mod product_service;

// Re-export auth service types
pub use auth_service::{AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims, Registration};

// Re-export catalog service types
pub use product_service::{
    CreateOptionDto, CreateProductDto, ProductDetail, ProductError, ProductService,
    ProductServiceImpl, UpdateOptionDto, UpdateProductDto,
};

// Re-export cart service types
pub use cart_service::{CartError, CartLine, CartService, CartServiceImpl, CartView};

// Re-export order service types
pub use order_service::{OrderDetail, OrderError, OrderService, OrderServiceImpl};

// Re-export chat service types
pub use chat_service::{
    ChatError, ChatService, ChatServiceImpl, ConversationSummary, Delivery, OutgoingMessage,
};

// Re-export marketplace service types
pub use marketplace_service::{
    ImportFailure, ImportReport, ListingsView, MarketplaceService, MarketplaceServiceError,
    MarketplaceServiceImpl, SyncReport,
};
