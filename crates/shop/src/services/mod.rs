//! Business services composed over the repositories.

pub mod auth;
pub mod checkout;
pub mod email;

pub use auth::AuthService;
pub use checkout::CheckoutService;
pub use email::EmailService;
