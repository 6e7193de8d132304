//! Domain models for the shop.
//!
//! Models are plain structs built from repository row types; inputs are the
//! validated payloads services accept.

pub mod cart;
pub mod invoice;
pub mod order;
pub mod product;
pub mod reservation;
pub mod user;

pub use cart::{Cart, CartItem, CartLine, CartWithItems};
pub use invoice::{Invoice, InvoiceItem};
pub use order::{Order, OrderItem, OrderWithItems};
pub use product::{Category, CreateProductInput, Product, ProductFilter, UpdateProductInput};
pub use reservation::StockReservation;
pub use user::{CurrentUser, User};

/// Session storage keys.
pub mod session_keys {
    /// The logged-in user, stored as [`super::CurrentUser`].
    pub const CURRENT_USER: &str = "current_user";
}
