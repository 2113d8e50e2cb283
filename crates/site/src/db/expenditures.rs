//! Expenditure ledger repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use trustline_core::{Amount, ExpenditureId};

use super::{ExpenditureStore, RepositoryError};
use crate::models::{Expenditure, ExpenditurePatch, NewExpenditure};

#[derive(Debug, sqlx::FromRow)]
struct ExpenditureRow {
    id: i32,
    amount: Decimal,
    reason: String,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TryFrom<ExpenditureRow> for Expenditure {
    type Error = RepositoryError;

    fn try_from(row: ExpenditureRow) -> Result<Self, Self::Error> {
        let amount = Amount::new(row.amount).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid expenditure amount in database: {e}"))
        })?;

        Ok(Self {
            id: ExpenditureId::new(row.id),
            amount,
            reason: row.reason,
            date: row.date,
            created_at: row.created_at,
        })
    }
}

/// `PostgreSQL` expenditure ledger.
#[derive(Debug, Clone)]
pub struct ExpenditureRepository {
    pool: PgPool,
}

impl ExpenditureRepository {
    /// Create a new expenditure repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenditureStore for ExpenditureRepository {
    async fn list(&self) -> Result<Vec<Expenditure>, RepositoryError> {
        let rows = sqlx::query_as::<_, ExpenditureRow>(
            r"
            SELECT id, amount, reason, date, created_at
            FROM site.expenditure
            ORDER BY date DESC, created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: ExpenditureId) -> Result<Option<Expenditure>, RepositoryError> {
        let row = sqlx::query_as::<_, ExpenditureRow>(
            r"
            SELECT id, amount, reason, date, created_at
            FROM site.expenditure
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert(&self, expenditure: NewExpenditure) -> Result<Expenditure, RepositoryError> {
        let row = sqlx::query_as::<_, ExpenditureRow>(
            r"
            INSERT INTO site.expenditure (amount, reason, date)
            VALUES ($1, $2, $3)
            RETURNING id, amount, reason, date, created_at
            ",
        )
        .bind(expenditure.amount)
        .bind(&expenditure.reason)
        .bind(expenditure.date)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(
        &self,
        id: ExpenditureId,
        patch: ExpenditurePatch,
    ) -> Result<Expenditure, RepositoryError> {
        let row = sqlx::query_as::<_, ExpenditureRow>(
            r"
            UPDATE site.expenditure
            SET
                amount = COALESCE($2, amount),
                reason = COALESCE($3, reason),
                date = COALESCE($4, date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, amount, reason, date, created_at
            ",
        )
        .bind(id)
        .bind(patch.amount)
        .bind(patch.reason)
        .bind(patch.date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn delete(&self, id: ExpenditureId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM site.expenditure WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
