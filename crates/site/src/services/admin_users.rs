//! Admin account management.
//!
//! Every operation here is reserved for the super admin; the route
//! extractor enforces that before the service is reached. The super admin's
//! own stored record is protected from deletion and password resets.

use thiserror::Error;
use tracing::instrument;

use trustline_core::{AdminUserId, Email};

use super::auth::password::{hash_password_blocking, validate_password};
use super::auth::{AuthError, SuperAdminPolicy};
use crate::db::{CredentialStore, RepositoryError};
use crate::models::AdminUser;

/// Errors from admin account management.
#[derive(Debug, Error)]
pub enum AdminUserError {
    /// Email or password input was rejected, or hashing failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The target is the super admin's stored record.
    #[error("The super admin account cannot be deleted or have its password reset")]
    ProtectedSuperAdmin,

    /// No admin has the given ID.
    #[error("admin not found")]
    NotFound,

    /// Another admin already uses this email.
    #[error("An admin with this email already exists")]
    EmailTaken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Admin account management service.
pub struct AdminUserService<'a> {
    store: &'a dyn CredentialStore,
    policy: &'a SuperAdminPolicy,
}

impl<'a> AdminUserService<'a> {
    #[must_use]
    pub fn new(store: &'a dyn CredentialStore, policy: &'a SuperAdminPolicy) -> Self {
        Self { store, policy }
    }

    /// All admins, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AdminUserError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<AdminUser>, AdminUserError> {
        Ok(self.store.list().await?)
    }

    /// Create an admin with a hashed password.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::Auth` for a malformed email or weak password
    /// - `AdminUserError::EmailTaken` if the email is already registered
    #[instrument(skip(self, password))]
    pub async fn create(&self, email: &str, password: &str) -> Result<AdminUser, AdminUserError> {
        let email = Email::parse(email).map_err(AuthError::from)?;
        validate_password(password)?;

        let password_hash = hash_password_blocking(password.to_string()).await?;

        let admin = self
            .store
            .create(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminUserError::EmailTaken,
                other => AdminUserError::Repository(other),
            })?;

        tracing::info!(admin_id = %admin.id, "Admin created");
        Ok(admin)
    }

    /// Delete an admin.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::NotFound` if no admin has `id`
    /// - `AdminUserError::ProtectedSuperAdmin` if `id` is the super admin's record
    #[instrument(skip(self))]
    pub async fn delete(&self, id: AdminUserId) -> Result<(), AdminUserError> {
        self.unprotected(id).await?;

        self.store.delete(id).await.map_err(not_found)?;
        tracing::info!(admin_id = %id, "Admin deleted");
        Ok(())
    }

    /// Replace an admin's password.
    ///
    /// # Errors
    ///
    /// - `AdminUserError::Auth` for a weak password
    /// - `AdminUserError::NotFound` if no admin has `id`
    /// - `AdminUserError::ProtectedSuperAdmin` if `id` is the super admin's record
    #[instrument(skip(self, password))]
    pub async fn update_password(
        &self,
        id: AdminUserId,
        password: &str,
    ) -> Result<(), AdminUserError> {
        validate_password(password)?;
        self.unprotected(id).await?;

        let password_hash = hash_password_blocking(password.to_string()).await?;
        self.store
            .update_password(id, &password_hash)
            .await
            .map_err(not_found)?;

        tracing::info!(admin_id = %id, "Admin password updated");
        Ok(())
    }

    async fn unprotected(&self, id: AdminUserId) -> Result<AdminUser, AdminUserError> {
        let admin = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(AdminUserError::NotFound)?;

        if self.policy.is_protected(&admin) {
            tracing::warn!(admin_id = %id, "Refused to modify the super admin record");
            return Err(AdminUserError::ProtectedSuperAdmin);
        }

        Ok(admin)
    }
}

fn not_found(err: RepositoryError) -> AdminUserError {
    match err {
        RepositoryError::NotFound => AdminUserError::NotFound,
        other => AdminUserError::Repository(other),
    }
}
