//! Payment provider (Stripe) integration.
//!
//! [`client`] wraps the REST API calls made at checkout; [`webhook`]
//! verifies and parses the signed event callbacks.

pub mod client;
pub mod error;
pub mod types;
pub mod webhook;

pub use client::StripeClient;
pub use error::StripeError;
pub use types::{ProviderInvoice, WebhookEvent, WebhookEventType};
pub use webhook::verify_signature;
