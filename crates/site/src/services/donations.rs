//! Donation ledger and verification workflow.

use chrono::Utc;
use tracing::instrument;

use trustline_core::{Amount, DonationId, DonationStatus};

use super::LedgerError;
use super::reporting::{self, DonationStats};
use super::validation::{ValidationError, optional_text, required_text};
use crate::db::{DonationStore, RepositoryError};
use crate::models::{Donation, NewDonation, SubmitDonationInput};

/// Donation ledger service.
pub struct DonationService<'a> {
    store: &'a dyn DonationStore,
}

impl<'a> DonationService<'a> {
    #[must_use]
    pub fn new(store: &'a dyn DonationStore) -> Self {
        Self { store }
    }

    /// Validate and record a donor's submission as `pending`.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for missing or malformed fields
    /// - `LedgerError::DuplicateTransaction` if the `transaction_id` is taken
    #[instrument(skip(self, input))]
    pub async fn submit(&self, input: SubmitDonationInput) -> Result<Donation, LedgerError> {
        let donation = validate_submission(input)?;

        // Fast path only; the store's atomic insert is authoritative.
        if self
            .store
            .find_by_transaction_id(&donation.transaction_id)
            .await?
            .is_some()
        {
            return Err(LedgerError::DuplicateTransaction);
        }

        let donation = self.store.insert(donation).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => LedgerError::DuplicateTransaction,
            other => LedgerError::Repository(other),
        })?;

        tracing::info!(donation_id = %donation.id, "Donation submitted");
        Ok(donation)
    }

    /// Look up a donation by its transaction reference.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a blank reference.
    pub async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Donation>, LedgerError> {
        let transaction_id = required_text("transaction_id", Some(transaction_id.to_string()))?;
        Ok(self.store.find_by_transaction_id(&transaction_id).await?)
    }

    /// All donations, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Donation>, LedgerError> {
        Ok(self.store.list().await?)
    }

    /// Move a donation to `verified` (for `"verified"`) or back to `pending`
    /// (for anything else).
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if no donation has `id`.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: DonationId, status: &str) -> Result<Donation, LedgerError> {
        let status = DonationStatus::from_requested(status);

        let donation = self
            .store
            .set_status(id, status, Utc::now())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => LedgerError::NotFound("Donation"),
                other => LedgerError::Repository(other),
            })?;

        tracing::info!(donation_id = %id, status = %donation.status, "Donation status updated");
        Ok(donation)
    }

    /// Aggregate statistics over the whole ledger.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` if the store fails.
    pub async fn stats(&self) -> Result<DonationStats, LedgerError> {
        let donations = self.store.list().await?;
        Ok(reporting::donation_stats(&donations))
    }
}

fn validate_submission(input: SubmitDonationInput) -> Result<NewDonation, ValidationError> {
    let name = required_text("name", input.name)?;
    let amount = input
        .amount
        .ok_or_else(|| ValidationError::new("amount is required"))
        .and_then(|value| {
            Amount::positive(value).map_err(|e| ValidationError::new(e.to_string()))
        })?;
    let transaction_id = required_text("transaction_id", input.transaction_id)?;

    if let Some(confidence) = input.receipt_confidence
        && !(0.0..=1.0).contains(&confidence)
    {
        return Err(ValidationError::new(
            "receipt_confidence must be between 0 and 1",
        ));
    }

    if let Some(data) = &input.receipt_parsed_data
        && !data.is_object()
    {
        return Err(ValidationError::new(
            "receipt_parsed_data must be a JSON object",
        ));
    }

    Ok(NewDonation {
        name,
        amount,
        transaction_id,
        phone: optional_text(input.phone),
        message: optional_text(input.message),
        receipt_processing_status: input.receipt_processing_status,
        receipt_confidence: input.receipt_confidence,
        receipt_parsed_data: input.receipt_parsed_data,
        receipt_url: optional_text(input.receipt_url),
    })
}
