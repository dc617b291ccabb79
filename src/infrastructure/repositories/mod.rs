//! Repository Implementations
//!
//! In-memory implementations of the domain repository traits.
//!
//! Every trait is implemented directly on
//! [`MemoryStore`](crate::infrastructure::store::MemoryStore), so one
//! `Arc<MemoryStore>` serves as all repositories at once. Each operation takes
//! the store lock once; read-modify-write operations (cart merge, order
//! creation, message append) hold the write lock for their whole duration.
//!
//! ## Available Repositories
//!
//! - **UserRepository** - User accounts
//! - **SessionRepository** - Refresh token sessions
//! - **CategoryRepository / ProductRepository** - Catalog and product options
//! - **CartRepository** - Cart rows with line merging
//! - **OrderRepository** - Orders and order items
//! - **ConversationRepository** - Conversations and messages
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sticker_shop::domain::ProductRepository;
//! use sticker_shop::infrastructure::store::MemoryStore;
//!
//! async fn catalog(store: Arc<MemoryStore>) {
//!     let products = store.list_products(&Default::default()).await?;
//! }
//! ```

mod cart_repository;
mod catalog_repository;
mod conversation_repository;
mod order_repository;
mod session_repository;
mod user_repository;
