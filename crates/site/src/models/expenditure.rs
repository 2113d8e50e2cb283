//! Expenditure ledger domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use trustline_core::{Amount, ExpenditureId};

/// A recorded spend of organization funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expenditure {
    /// Unique expenditure ID.
    pub id: ExpenditureId,
    pub amount: Amount,
    pub reason: String,
    /// Calendar date of the spend.
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A validated expenditure ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpenditure {
    pub amount: Amount,
    pub reason: String,
    pub date: NaiveDate,
}

/// A validated partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenditurePatch {
    pub amount: Option<Amount>,
    pub reason: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ExpenditurePatch {
    /// Returns `true` if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.amount.is_none() && self.reason.is_none() && self.date.is_none()
    }
}

/// Request body for creating an expenditure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateExpenditureInput {
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub date: Option<String>,
}

/// Request body for patching an expenditure.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateExpenditureInput {
    pub id: ExpenditureId,
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
    pub date: Option<String>,
}

/// Request body for deleting an expenditure.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteExpenditureInput {
    pub id: ExpenditureId,
}
