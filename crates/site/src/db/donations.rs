//! Donation ledger repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use trustline_core::{Amount, DonationId, DonationStatus, ReceiptProcessingStatus};

use super::{DonationStore, RepositoryError};
use crate::models::{Donation, NewDonation};

const DONATION_COLUMNS: &str = "id, name, amount, transaction_id, phone, message, status, \
     verified_at, receipt_processing_status, receipt_confidence, receipt_parsed_data, \
     receipt_url, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct DonationRow {
    id: i32,
    name: String,
    amount: Decimal,
    transaction_id: String,
    phone: Option<String>,
    message: Option<String>,
    status: DonationStatus,
    verified_at: Option<DateTime<Utc>>,
    receipt_processing_status: Option<ReceiptProcessingStatus>,
    receipt_confidence: Option<f64>,
    receipt_parsed_data: Option<serde_json::Value>,
    receipt_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DonationRow> for Donation {
    type Error = RepositoryError;

    fn try_from(row: DonationRow) -> Result<Self, Self::Error> {
        let amount = Amount::new(row.amount).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid donation amount in database: {e}"))
        })?;

        Ok(Self {
            id: DonationId::new(row.id),
            name: row.name,
            amount,
            transaction_id: row.transaction_id,
            phone: row.phone,
            message: row.message,
            status: row.status,
            verified_at: row.verified_at,
            receipt_processing_status: row.receipt_processing_status,
            receipt_confidence: row.receipt_confidence,
            receipt_parsed_data: row.receipt_parsed_data,
            receipt_url: row.receipt_url,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` donation ledger.
///
/// `transaction_id` uniqueness is enforced by the `donation_transaction_id_key`
/// constraint, so concurrent duplicate submissions cannot both succeed.
#[derive(Debug, Clone)]
pub struct DonationRepository {
    pool: PgPool,
}

impl DonationRepository {
    /// Create a new donation repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DonationStore for DonationRepository {
    async fn list(&self) -> Result<Vec<Donation>, RepositoryError> {
        let rows = sqlx::query_as::<_, DonationRow>(&format!(
            "SELECT {DONATION_COLUMNS} FROM site.donation ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: DonationId) -> Result<Option<Donation>, RepositoryError> {
        let row = sqlx::query_as::<_, DonationRow>(&format!(
            "SELECT {DONATION_COLUMNS} FROM site.donation WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Donation>, RepositoryError> {
        let row = sqlx::query_as::<_, DonationRow>(&format!(
            "SELECT {DONATION_COLUMNS} FROM site.donation WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert(&self, donation: NewDonation) -> Result<Donation, RepositoryError> {
        let row = sqlx::query_as::<_, DonationRow>(&format!(
            r"
            INSERT INTO site.donation (
                name, amount, transaction_id, phone, message,
                receipt_processing_status, receipt_confidence, receipt_parsed_data, receipt_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {DONATION_COLUMNS}
            "
        ))
        .bind(&donation.name)
        .bind(donation.amount)
        .bind(&donation.transaction_id)
        .bind(&donation.phone)
        .bind(&donation.message)
        .bind(donation.receipt_processing_status)
        .bind(donation.receipt_confidence)
        .bind(&donation.receipt_parsed_data)
        .bind(&donation.receipt_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("transaction_id already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    async fn set_status(
        &self,
        id: DonationId,
        status: DonationStatus,
        now: DateTime<Utc>,
    ) -> Result<Donation, RepositoryError> {
        let row = sqlx::query_as::<_, DonationRow>(&format!(
            r"
            UPDATE site.donation
            SET
                status = $2,
                verified_at = CASE
                    WHEN $2 = 'verified'::site.donation_status THEN COALESCE(verified_at, $3)
                    ELSE NULL
                END
            WHERE id = $1
            RETURNING {DONATION_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
