//! Wire types shared by the server and its clients.
//!
//! Monetary values travel as integer cents (`*_minor` fields). Timestamps
//! are RFC3339 with an explicit offset (local user time); the server
//! converts to UTC at the boundary.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub opening_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub balance_minor: i64,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountCreated {
        pub id: Uuid,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
        Transfer,
        Fee,
        InvestmentDeposit,
        InvestmentWithdrawal,
        InvestmentReturn,
        Lending,
        Repayment,
        Reversal,
    }

    /// Body for the single-account entry endpoints (income/expense/fee) and
    /// for the explicit-kind entry endpoint.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        pub account_id: Uuid,
        pub amount_minor: i64,
        pub category: Option<String>,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryKindNew {
        pub account_id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub category: Option<String>,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        pub amount_minor: i64,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReversalNew {
        /// Optional: if absent, server uses now().
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
        /// If present, acts as an allow-list of kinds to return.
        pub kinds: Option<Vec<TransactionKind>>,
        /// Matches transactions touching this account on either side.
        pub account_id: Option<Uuid>,
        pub category: Option<String>,
        pub include_reversals: Option<bool>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub source_account_id: Option<Uuid>,
        pub destination_account_id: Option<Uuid>,
        pub amount_minor: i64,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        pub category: Option<String>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GoalStatus {
        Active,
        Paused,
        Completed,
        Abandoned,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target_minor: i64,
        pub deadline: Option<DateTime<FixedOffset>>,
        pub account_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub name: String,
        pub target_minor: i64,
        pub deadline: Option<DateTime<FixedOffset>>,
        pub status: GoalStatus,
        pub account_id: Option<Uuid>,
        pub abandoned_reason: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalListResponse {
        pub goals: Vec<GoalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributeNew {
        pub source_account_id: Uuid,
        pub amount_minor: i64,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawNew {
        pub destination_account_id: Uuid,
        pub amount_minor: i64,
        pub reason: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AbandonNew {
        pub reason: String,
        /// Required whenever the goal still holds funds.
        pub refund_account_id: Option<Uuid>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    /// New derived balance after a contribution or withdrawal.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalBalance {
        pub goal_id: Uuid,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AbandonResult {
        pub goal_id: Uuid,
        pub refunded_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalProgressView {
        pub goal_id: Uuid,
        pub name: String,
        pub status: GoalStatus,
        pub display_status: GoalStatus,
        pub current_minor: i64,
        pub target_minor: i64,
        pub percent: f64,
        pub achieved: bool,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ContributionKind {
        Contribution,
        Withdrawal,
        Refund,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub kind: ContributionKind,
        pub amount_minor: i64,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        pub note: Option<String>,
        pub transaction_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalHistoryResponse {
        pub entries: Vec<ContributionView>,
    }
}

pub mod report {
    use super::*;

    /// Query window for every report endpoint, `[start, end]` inclusive.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportWindow {
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub start: DateTime<FixedOffset>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub end: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ByKindQuery {
        pub kind: super::transaction::TransactionKind,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub start: DateTime<FixedOffset>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub end: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct KindReportResponse {
        pub transactions: Vec<super::transaction::TransactionView>,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotalView {
        pub category: String,
        pub total_minor: i64,
        pub count: u64,
        pub average_minor: i64,
        pub percentage: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryBreakdownResponse {
        pub categories: Vec<CategoryTotalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendPointView {
        pub period: String,
        pub income_minor: i64,
        pub expenses_minor: i64,
        pub fees_minor: i64,
        pub savings_minor: i64,
        pub savings_rate: f64,
        pub income_change_pct: f64,
        pub expenses_change_pct: f64,
        pub savings_change_pct: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendResponse {
        pub points: Vec<TrendPointView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashFlowPointView {
        pub date: NaiveDate,
        pub net_minor: i64,
        pub cumulative_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashFlowResponse {
        pub points: Vec<CashFlowPointView>,
    }
}
