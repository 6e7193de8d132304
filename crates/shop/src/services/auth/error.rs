//! Authentication error types.

use thiserror::Error;

use tamarind_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password is wrong. Deliberately indistinguishable between
    /// the two so the API does not leak which accounts exist.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password doesn't meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    PasswordHash(String),

    /// Database error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
