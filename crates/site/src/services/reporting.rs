//! Financial reporting over ledger snapshots.
//!
//! Pure functions: callers load the ledgers and pass slices in.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use trustline_core::Amount;

use crate::models::{Donation, Expenditure};

/// Receipts read with at least this confidence count as high confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Aggregate view of the donation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationStats {
    pub total_donations: usize,
    pub verified_donations: usize,
    pub pending_donations: usize,
    pub completed_receipts: usize,
    pub high_confidence_receipts: usize,
    pub total_amount_verified: Amount,
    /// Sum across every donation regardless of status.
    pub total_amount: Amount,
    /// Mean over donations with a non-zero amount; `None` when there are none.
    pub average_amount: Option<Decimal>,
    /// Maximum over donations with a non-zero amount; `None` when there are none.
    pub max_amount: Option<Amount>,
}

/// Expenditure total for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRollup {
    /// `YYYY-MM`
    pub month_key: String,
    /// e.g. `February 2024`
    pub month_label: String,
    pub total: Amount,
}

/// Public funding and spending summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransparencyReport {
    /// Sum of verified donations.
    pub total_funding: Amount,
    pub total_expenditure: Amount,
    /// `total_funding - total_expenditure`; negative when overspent.
    pub remaining_balance: Decimal,
    /// One entry per month with spending, most recent first.
    pub monthly_expenditure: Vec<MonthlyRollup>,
}

/// Compute donation statistics in a single pass.
#[must_use]
pub fn donation_stats(donations: &[Donation]) -> DonationStats {
    let mut stats = DonationStats {
        total_donations: donations.len(),
        verified_donations: 0,
        pending_donations: 0,
        completed_receipts: 0,
        high_confidence_receipts: 0,
        total_amount_verified: Amount::ZERO,
        total_amount: Amount::ZERO,
        average_amount: None,
        max_amount: None,
    };
    let mut positive_sum = Decimal::ZERO;
    let mut positive_count: u32 = 0;

    for donation in donations {
        if donation.status.is_verified() {
            stats.verified_donations += 1;
            stats.total_amount_verified += donation.amount;
        } else {
            stats.pending_donations += 1;
        }

        if donation
            .receipt_processing_status
            .is_some_and(|s| s.is_completed())
        {
            stats.completed_receipts += 1;
        }
        if donation
            .receipt_confidence
            .is_some_and(|c| c >= HIGH_CONFIDENCE_THRESHOLD)
        {
            stats.high_confidence_receipts += 1;
        }

        stats.total_amount += donation.amount;

        if !donation.amount.is_zero() {
            positive_sum = positive_sum.saturating_add(donation.amount.value());
            positive_count += 1;
            stats.max_amount = stats.max_amount.max(Some(donation.amount));
        }
    }

    if positive_count > 0 {
        stats.average_amount = Some((positive_sum / Decimal::from(positive_count)).normalize());
    }

    stats
}

/// Join both ledgers into the public transparency report.
#[must_use]
pub fn transparency_report(
    donations: &[Donation],
    expenditures: &[Expenditure],
) -> TransparencyReport {
    let total_funding: Amount = donations
        .iter()
        .filter(|d| d.status.is_verified())
        .map(|d| d.amount)
        .sum();
    let total_expenditure: Amount = expenditures.iter().map(|e| e.amount).sum();

    let mut by_month: BTreeMap<(i32, u32), Amount> = BTreeMap::new();
    for expenditure in expenditures {
        let key = (expenditure.date.year(), expenditure.date.month());
        *by_month.entry(key).or_insert(Amount::ZERO) += expenditure.amount;
    }

    let monthly_expenditure = by_month
        .into_iter()
        .rev()
        .filter_map(|((year, month), total)| {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            Some(MonthlyRollup {
                month_key: first.format("%Y-%m").to_string(),
                month_label: first.format("%B %Y").to_string(),
                total,
            })
        })
        .collect();

    TransparencyReport {
        total_funding,
        total_expenditure,
        remaining_balance: total_funding.value() - total_expenditure.value(),
        monthly_expenditure,
    }
}
