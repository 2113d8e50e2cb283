//! In-memory stores.
//!
//! Used by tests and local demos. Each store keeps its records behind a
//! single `tokio::sync::RwLock`, so every check-then-write runs under one
//! write guard and matches the atomicity of the `PostgreSQL` constraints.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use trustline_core::{AdminUserId, DonationId, DonationStatus, Email, ExpenditureId};

use super::{CredentialStore, DonationStore, ExpenditureStore, RepositoryError};
use crate::models::{
    AdminUser, Donation, Expenditure, ExpenditurePatch, NewDonation, NewExpenditure,
};

#[derive(Debug)]
struct Table<T> {
    next_id: i32,
    rows: BTreeMap<i32, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    const fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    table: RwLock<Table<AdminUser>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let table = self.table.read().await;
        let mut admins: Vec<AdminUser> = table.rows.values().cloned().collect();
        admins.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
        });
        Ok(admins)
    }

    async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id.as_i32()).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<AdminUser>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|a| &a.email == email).cloned())
    }

    async fn create(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|a| &a.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = table.allocate_id();
        let admin = AdminUser {
            id: AdminUserId::new(id),
            email: email.clone(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        table.rows.insert(id, admin.clone());
        Ok(admin)
    }

    async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id.as_i32())
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_password(
        &self,
        id: AdminUserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut table = self.table.write().await;
        let admin = table
            .rows
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;
        admin.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let len = self.table.read().await.rows.len();
        i64::try_from(len).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// =============================================================================
// Donations
// =============================================================================

/// In-memory donation ledger.
#[derive(Debug, Default)]
pub struct MemoryDonationStore {
    table: RwLock<Table<Donation>>,
}

impl MemoryDonationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DonationStore for MemoryDonationStore {
    async fn list(&self) -> Result<Vec<Donation>, RepositoryError> {
        let table = self.table.read().await;
        let mut donations: Vec<Donation> = table.rows.values().cloned().collect();
        donations.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
        });
        Ok(donations)
    }

    async fn get(&self, id: DonationId) -> Result<Option<Donation>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id.as_i32()).cloned())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Donation>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|d| d.transaction_id == transaction_id)
            .cloned())
    }

    async fn insert(&self, donation: NewDonation) -> Result<Donation, RepositoryError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|d| d.transaction_id == donation.transaction_id)
        {
            return Err(RepositoryError::Conflict(
                "transaction_id already exists".to_owned(),
            ));
        }

        let id = table.allocate_id();
        let record = Donation {
            id: DonationId::new(id),
            name: donation.name,
            amount: donation.amount,
            transaction_id: donation.transaction_id,
            phone: donation.phone,
            message: donation.message,
            status: DonationStatus::Pending,
            verified_at: None,
            receipt_processing_status: donation.receipt_processing_status,
            receipt_confidence: donation.receipt_confidence,
            receipt_parsed_data: donation.receipt_parsed_data,
            receipt_url: donation.receipt_url,
            created_at: Utc::now(),
        };
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn set_status(
        &self,
        id: DonationId,
        status: DonationStatus,
        now: DateTime<Utc>,
    ) -> Result<Donation, RepositoryError> {
        let mut table = self.table.write().await;
        let donation = table
            .rows
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;

        donation.status = status;
        donation.verified_at = if status.is_verified() {
            Some(donation.verified_at.unwrap_or(now))
        } else {
            None
        };
        Ok(donation.clone())
    }
}

// =============================================================================
// Expenditures
// =============================================================================

/// In-memory expenditure ledger.
#[derive(Debug, Default)]
pub struct MemoryExpenditureStore {
    table: RwLock<Table<Expenditure>>,
}

impl MemoryExpenditureStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenditureStore for MemoryExpenditureStore {
    async fn list(&self) -> Result<Vec<Expenditure>, RepositoryError> {
        let table = self.table.read().await;
        let mut expenditures: Vec<Expenditure> = table.rows.values().cloned().collect();
        expenditures.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
        });
        Ok(expenditures)
    }

    async fn get(&self, id: ExpenditureId) -> Result<Option<Expenditure>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id.as_i32()).cloned())
    }

    async fn insert(&self, expenditure: NewExpenditure) -> Result<Expenditure, RepositoryError> {
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        let record = Expenditure {
            id: ExpenditureId::new(id),
            amount: expenditure.amount,
            reason: expenditure.reason,
            date: expenditure.date,
            created_at: Utc::now(),
        };
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: ExpenditureId,
        patch: ExpenditurePatch,
    ) -> Result<Expenditure, RepositoryError> {
        let mut table = self.table.write().await;
        let expenditure = table
            .rows
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;

        if let Some(amount) = patch.amount {
            expenditure.amount = amount;
        }
        if let Some(reason) = patch.reason {
            expenditure.reason = reason;
        }
        if let Some(date) = patch.date {
            expenditure.date = date;
        }
        Ok(expenditure.clone())
    }

    async fn delete(&self, id: ExpenditureId) -> Result<(), RepositoryError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id.as_i32())
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use trustline_core::Amount;

    use super::*;

    fn new_donation(transaction_id: &str) -> NewDonation {
        NewDonation {
            name: "Asha".to_string(),
            amount: Amount::parse("500").unwrap(),
            transaction_id: transaction_id.to_string(),
            phone: None,
            message: None,
            receipt_processing_status: None,
            receipt_confidence: None,
            receipt_parsed_data: None,
            receipt_url: None,
        }
    }

    #[tokio::test]
    async fn test_credential_email_is_unique() {
        let store = MemoryCredentialStore::new();
        let email = Email::parse("ops@example.org").unwrap();

        store.create(&email, "hash-a").await.unwrap();
        let err = store.create(&email, "hash-b").await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_credential_delete_missing_is_not_found() {
        let store = MemoryCredentialStore::new();
        let err = store.delete(AdminUserId::new(99)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_donations_one_wins() {
        let store = Arc::new(MemoryDonationStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(new_donation("UTR-1")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, RepositoryError::Conflict(_))),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_status_preserves_first_verification_time() {
        let store = MemoryDonationStore::new();
        let donation = store.insert(new_donation("UTR-2")).await.unwrap();
        let first = Utc::now();
        let later = first + chrono::Duration::minutes(5);

        let verified = store
            .set_status(donation.id, DonationStatus::Verified, first)
            .await
            .unwrap();
        let again = store
            .set_status(donation.id, DonationStatus::Verified, later)
            .await
            .unwrap();
        assert_eq!(verified, again);
        assert_eq!(again.verified_at, Some(first));

        let pending = store
            .set_status(donation.id, DonationStatus::Pending, later)
            .await
            .unwrap();
        assert_eq!(pending.status, DonationStatus::Pending);
        assert!(pending.verified_at.is_none());
    }

    #[tokio::test]
    async fn test_expenditures_listed_newest_date_first() {
        let store = MemoryExpenditureStore::new();
        for (day, reason) in [(15, "Rent"), (1, "Supplies"), (28, "Transport")] {
            store
                .insert(NewExpenditure {
                    amount: Amount::parse("10").unwrap(),
                    reason: reason.to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                })
                .await
                .unwrap();
        }

        let reasons: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.reason)
            .collect();
        assert_eq!(reasons, ["Transport", "Rent", "Supplies"]);
    }

    #[tokio::test]
    async fn test_expenditure_patch_leaves_absent_fields() {
        let store = MemoryExpenditureStore::new();
        let created = store
            .insert(NewExpenditure {
                amount: Amount::parse("120").unwrap(),
                reason: "Printing".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            })
            .await
            .unwrap();

        let updated = store
            .update(
                created.id,
                ExpenditurePatch {
                    reason: Some("Printing and binding".to_string()),
                    ..ExpenditurePatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.amount, created.amount);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.reason, "Printing and binding");
    }
}
