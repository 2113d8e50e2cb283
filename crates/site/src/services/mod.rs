//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Session issuing/verification and the super-admin policy
//! - `admin_users` - Admin account management (super admin only)
//! - `donations` - Donation ledger and verification workflow
//! - `expenditures` - Expenditure ledger
//! - `reporting` - Donation statistics and the transparency report

pub mod admin_users;
pub mod auth;
pub mod donations;
pub mod expenditures;
pub mod reporting;
pub mod validation;

use thiserror::Error;

use crate::db::RepositoryError;

pub use admin_users::{AdminUserError, AdminUserService};
pub use auth::{AuthError, SessionAuthority, SessionError};
pub use donations::DonationService;
pub use expenditures::ExpenditureService;
pub use validation::ValidationError;

/// Errors from the donation and expenditure ledgers.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A donation with the same `transaction_id` already exists.
    #[error("A donation with this transaction ID already exists")]
    DuplicateTransaction,

    /// The targeted record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
