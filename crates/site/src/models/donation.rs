//! Donation ledger domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use trustline_core::{Amount, DonationId, DonationStatus, ReceiptProcessingStatus};

/// A donor-submitted donation claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Donation {
    /// Unique donation ID.
    pub id: DonationId,
    /// Donor name.
    pub name: String,
    /// Donated amount, always greater than zero for new submissions.
    pub amount: Amount,
    /// Bank or payment reference, unique across the ledger.
    pub transaction_id: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    /// Verification state.
    pub status: DonationStatus,
    /// Set exactly when `status` is `Verified`.
    pub verified_at: Option<DateTime<Utc>>,
    pub receipt_processing_status: Option<ReceiptProcessingStatus>,
    /// Receipt reader confidence in `[0, 1]`.
    pub receipt_confidence: Option<f64>,
    pub receipt_parsed_data: Option<serde_json::Value>,
    /// Object-storage URL of the uploaded receipt.
    pub receipt_url: Option<String>,
    /// When the donation was submitted.
    pub created_at: DateTime<Utc>,
}

/// A validated donation ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub name: String,
    pub amount: Amount,
    pub transaction_id: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub receipt_processing_status: Option<ReceiptProcessingStatus>,
    pub receipt_confidence: Option<f64>,
    pub receipt_parsed_data: Option<serde_json::Value>,
    pub receipt_url: Option<String>,
}

/// Request body for a public donation submission.
///
/// Fields are optional at the wire level so missing values produce a
/// field-specific validation message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitDonationInput {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub transaction_id: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub receipt_processing_status: Option<ReceiptProcessingStatus>,
    pub receipt_confidence: Option<f64>,
    pub receipt_parsed_data: Option<serde_json::Value>,
    pub receipt_url: Option<String>,
}

/// Request body for a duplicate check.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckDonationInput {
    pub transaction_id: String,
}

/// Request body for changing a donation's verification status.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDonationStatusInput {
    pub id: DonationId,
    pub status: String,
}
