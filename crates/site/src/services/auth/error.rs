//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur while authenticating an admin or managing passwords.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] trustline_core::EmailError),

    /// Password was empty.
    #[error("password is required")]
    MissingPassword,

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email/password combination was rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Hashing failed or a stored hash is unreadable.
    #[error("password hashing failed")]
    PasswordHash,

    /// The blocking hash task did not complete.
    #[error("password task failed: {0}")]
    TaskFailed(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Reasons a session token fails verification.
///
/// Only logged at debug level; callers see a uniform 401.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token claims are invalid")]
    InvalidClaims,

    #[error("token has expired")]
    Expired,

    #[error("signing key rejected: {0}")]
    InvalidKey(String),
}
