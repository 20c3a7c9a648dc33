//! Output types for the reporting aggregations.
//!
//! Every series is computed on demand from the ledger after the reversal
//! resolver has removed voided activity; none of these values are stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{MoneyCents, Transaction};

/// Transactions of one kind inside a window, voided activity excluded,
/// plus their total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KindReport {
    pub transactions: Vec<Transaction>,
    pub total: MoneyCents,
}

/// One row of the spending-by-category breakdown (expenses + fees).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: MoneyCents,
    pub count: u64,
    pub average: MoneyCents,
    /// Share of the grand total, in percent.
    pub percentage: f64,
}

/// One bucket of the monthly or yearly trend series.
///
/// Percentage deltas compare against the immediately preceding bucket and
/// are defined as 0 when the previous value is 0 (never NaN or infinite).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `"2026-08"` for monthly buckets, `"2026"` for yearly ones.
    pub period: String,
    pub income: MoneyCents,
    pub expenses: MoneyCents,
    pub fees: MoneyCents,
    pub savings: MoneyCents,
    /// `100 * savings / income`, 0 when income is 0.
    pub savings_rate: f64,
    pub income_change_pct: f64,
    pub expenses_change_pct: f64,
    pub savings_change_pct: f64,
}

/// One day of the cash-flow series: net movement and running cumulative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub date: NaiveDate,
    pub net: MoneyCents,
    pub cumulative: MoneyCents,
}
