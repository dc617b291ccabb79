//! # Domain Entities
//!
//! Core domain entities of the storefront. Every entity lives in a table of
//! the in-memory store and is identified by a store-assigned `i64`.
//!
//! ## Core Entities
//!
//! - **User**: Account with credentials, display name and admin flag
//! - **Category / Product / ProductOption**: The sticker catalog
//! - **CartItem**: A pending line in a user's cart
//! - **Order / OrderItem**: A purchase and its lines, priced at checkout
//! - **Conversation / Message**: Order-bound or direct buyer-seller chat
//!
//! ## Supporting Entities
//!
//! - **Session**: Refresh token sessions
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod cart;
mod conversation;
mod order;
mod product;
mod session;
mod user;

pub use user::{NewUser, User, UserRepository};

pub use product::{
    Category, CategoryRepository, NewProduct, NewProductOption, OptionType, Product,
    ProductFilter, ProductOption, ProductRepository,
};

pub use cart::{CartItem, CartRepository};

pub use order::{
    ConsumedLine, NewOrder, NewOrderItem, Order, OrderItem, OrderRepository, OrderStatus,
    PlacedOrder,
};

pub use conversation::{Conversation, ConversationRepository, Message, MessageType, NewMessage};

pub use session::{Session, SessionRepository};
