//! Expenditure ledger.

use rust_decimal::Decimal;
use tracing::instrument;

use trustline_core::{Amount, ExpenditureId};

use super::LedgerError;
use super::validation::{ValidationError, parse_date, required_text};
use crate::db::{ExpenditureStore, RepositoryError};
use crate::models::{
    CreateExpenditureInput, Expenditure, ExpenditurePatch, NewExpenditure, UpdateExpenditureInput,
};

/// Expenditure ledger service.
pub struct ExpenditureService<'a> {
    store: &'a dyn ExpenditureStore,
}

impl<'a> ExpenditureService<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ExpenditureStore) -> Self {
        Self { store }
    }

    /// All expenditures, newest date first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Expenditure>, LedgerError> {
        Ok(self.store.list().await?)
    }

    /// Record a new expenditure.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a missing or malformed field.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateExpenditureInput) -> Result<Expenditure, LedgerError> {
        let amount = input
            .amount
            .ok_or_else(|| ValidationError::new("amount is required"))
            .and_then(parse_amount)?;
        let reason = required_text("reason", input.reason)?;
        let date = input
            .date
            .ok_or_else(|| ValidationError::new("date is required"))
            .and_then(|d| parse_date("date", &d))?;

        let expenditure = self
            .store
            .insert(NewExpenditure {
                amount,
                reason,
                date,
            })
            .await?;

        tracing::info!(expenditure_id = %expenditure.id, "Expenditure recorded");
        Ok(expenditure)
    }

    /// Apply a partial update. Absent fields stay as they are; an empty
    /// update returns the current record.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` if a present field is malformed
    /// - `LedgerError::NotFound` if no expenditure has the id
    #[instrument(skip(self, input), fields(expenditure_id = %input.id))]
    pub async fn update(&self, input: UpdateExpenditureInput) -> Result<Expenditure, LedgerError> {
        let patch = ExpenditurePatch {
            amount: input.amount.map(parse_amount).transpose()?,
            reason: input
                .reason
                .map(|r| required_text("reason", Some(r)))
                .transpose()?,
            date: input
                .date
                .map(|d| parse_date("date", &d))
                .transpose()?,
        };

        if patch.is_empty() {
            return self
                .store
                .get(input.id)
                .await?
                .ok_or(LedgerError::NotFound("Expenditure"));
        }

        self.store
            .update(input.id, patch)
            .await
            .map_err(not_found)
    }

    /// Remove an expenditure.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if no expenditure has `id`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ExpenditureId) -> Result<(), LedgerError> {
        self.store.delete(id).await.map_err(not_found)?;
        tracing::info!(expenditure_id = %id, "Expenditure deleted");
        Ok(())
    }
}

fn parse_amount(value: Decimal) -> Result<Amount, ValidationError> {
    Amount::new(value).map_err(|e| ValidationError::new(e.to_string()))
}

fn not_found(err: RepositoryError) -> LedgerError {
    match err {
        RepositoryError::NotFound => LedgerError::NotFound("Expenditure"),
        other => LedgerError::Repository(other),
    }
}
