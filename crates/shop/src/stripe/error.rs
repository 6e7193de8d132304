//! Payment provider error types.

use thiserror::Error;

/// Errors from the payment provider integration.
#[derive(Debug, Error)]
pub enum StripeError {
    /// The HTTP request could not be sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The response could not be parsed.
    #[error("invalid response: {0}")]
    Response(String),

    /// The provider returned an error payload.
    #[error("provider error: {0}")]
    Api(String),

    /// Webhook signature verification failed.
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),
}
