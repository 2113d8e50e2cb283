//! Persistence for the site.
//!
//! # Schema: `site`
//!
//! ## Tables
//!
//! - `admin_user` - Administrator accounts (unique email, Argon2 hash)
//! - `donation` - Donation ledger (unique `transaction_id`)
//! - `expenditure` - Expenditure ledger
//!
//! Each ledger is reached through a store trait with a `PostgreSQL`
//! implementation and an in-memory implementation ([`memory`]).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p trustline-cli -- migrate
//! ```

pub mod admin_users;
pub mod donations;
pub mod expenditures;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use trustline_core::{AdminUserId, DonationId, DonationStatus, Email, ExpenditureId};

use crate::models::{
    AdminUser, Donation, Expenditure, ExpenditurePatch, NewDonation, NewExpenditure,
};

pub use admin_users::AdminUserRepository;
pub use donations::DonationRepository;
pub use expenditures::ExpenditureRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Administrator credential records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All admins, newest first.
    async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError>;

    async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError>;

    async fn get_by_email(&self, email: &Email) -> Result<Option<AdminUser>, RepositoryError>;

    /// Insert an admin. A taken email yields `RepositoryError::Conflict`.
    async fn create(&self, email: &Email, password_hash: &str)
    -> Result<AdminUser, RepositoryError>;

    /// Remove an admin. An absent id yields `RepositoryError::NotFound`.
    async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError>;

    /// Replace an admin's password hash. An absent id yields `RepositoryError::NotFound`.
    async fn update_password(
        &self,
        id: AdminUserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<i64, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// The donation ledger.
#[async_trait]
pub trait DonationStore: Send + Sync {
    /// All donations, newest first by `created_at`.
    async fn list(&self) -> Result<Vec<Donation>, RepositoryError>;

    async fn get(&self, id: DonationId) -> Result<Option<Donation>, RepositoryError>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Donation>, RepositoryError>;

    /// Insert a donation as `pending`.
    ///
    /// The uniqueness check and the insert are a single atomic step: a taken
    /// `transaction_id` yields `RepositoryError::Conflict`.
    async fn insert(&self, donation: NewDonation) -> Result<Donation, RepositoryError>;

    /// Set the verification status.
    ///
    /// `Verified` keeps an existing `verified_at` and otherwise stamps `now`;
    /// `Pending` clears it.
    async fn set_status(
        &self,
        id: DonationId,
        status: DonationStatus,
        now: DateTime<Utc>,
    ) -> Result<Donation, RepositoryError>;
}

/// The expenditure ledger.
#[async_trait]
pub trait ExpenditureStore: Send + Sync {
    /// All expenditures, newest first by `date` then `created_at`.
    async fn list(&self) -> Result<Vec<Expenditure>, RepositoryError>;

    async fn get(&self, id: ExpenditureId) -> Result<Option<Expenditure>, RepositoryError>;

    async fn insert(&self, expenditure: NewExpenditure) -> Result<Expenditure, RepositoryError>;

    /// Apply the fields present in `patch`.
    async fn update(
        &self,
        id: ExpenditureId,
        patch: ExpenditurePatch,
    ) -> Result<Expenditure, RepositoryError>;

    async fn delete(&self, id: ExpenditureId) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
