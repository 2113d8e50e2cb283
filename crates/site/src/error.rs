//! Unified error handling for the site.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::admin_users::AdminUserError;
use crate::services::auth::AuthError;
use crate::services::LedgerError;

/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Uniqueness violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn client_message(&self) -> String {
        match self {
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Site request error"
            );
        }

        let body = serde_json::json!({ "error": self.client_message() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Not found".to_string()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(_) | AuthError::MissingPassword | AuthError::WeakPassword(_) => {
                Self::BadRequest(err.to_string())
            }
            AuthError::InvalidCredentials => {
                Self::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            AuthError::PasswordHash | AuthError::TaskFailed(_) => Self::Internal(err.to_string()),
            AuthError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<AdminUserError> for AppError {
    fn from(err: AdminUserError) -> Self {
        match err {
            AdminUserError::Auth(e) => e.into(),
            AdminUserError::ProtectedSuperAdmin => Self::BadRequest(err.to_string()),
            AdminUserError::NotFound => Self::NotFound("Admin not found".to_string()),
            AdminUserError::EmailTaken => Self::Conflict(err.to_string()),
            AdminUserError::Repository(e) => e.into(),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(e) => Self::BadRequest(e.to_string()),
            LedgerError::DuplicateTransaction => Self::Conflict(err.to_string()),
            LedgerError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            LedgerError::Repository(e) => e.into(),
        }
    }
}

/// Set the Sentry user context from the session identity.
pub fn set_sentry_user(subject_id: &str, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(subject_id.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
