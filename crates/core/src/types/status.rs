//! Status enums for ledger entries.

use serde::{Deserialize, Serialize};

/// Verification state of a donation claim.
///
/// Every donation starts `Pending`; an admin moves it to `Verified` after
/// matching the claim against the bank statement. The transition is
/// reversible and there is no rejected state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "site.donation_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    #[default]
    Pending,
    Verified,
}

impl DonationStatus {
    /// Interpret a status requested by an admin.
    ///
    /// `"verified"` (case-insensitive, surrounding whitespace ignored) selects
    /// `Verified`; every other value selects `Pending`.
    #[must_use]
    pub fn from_requested(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("verified") {
            Self::Verified
        } else {
            Self::Pending
        }
    }

    /// Returns `true` for `Verified`.
    #[must_use]
    pub const fn is_verified(self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Verified => write!(f, "verified"),
        }
    }
}

/// Progress of the automated receipt reader for a donation's uploaded receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "site.receipt_processing_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ReceiptProcessingStatus {
    /// Returns `true` once the receipt reader has finished successfully.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}
