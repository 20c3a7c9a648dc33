//! Core engine for the personal-finance tracker.
//!
//! The engine owns three things:
//!
//! - the **ledger**: append-only `transactions` rows plus `accounts`
//!   balances, written only by the entry/transfer/reversal operations;
//! - the **goal sub-ledger**: virtual goals whose spendable amount is
//!   derived from allocation rows, consumed FIFO on withdrawal;
//! - the **reporting aggregations**: reversal-aware category, trend and
//!   cash-flow series recomputed from the ledger on every query.
//!
//! All mutations run inside a single database transaction, so a goal
//! contribution commits its fund transfer, its allocation row and its audit
//! entry as one durable unit or not at all.

pub use accounts::Account;
pub use allocations::GoalAllocation;
pub use commands::{
    AbandonCmd, ContributeCmd, EntryCmd, ExpenseCmd, FeeCmd, IncomeCmd, TransferCmd, TxMeta,
    WithdrawCmd,
};
pub use contributions::{ContributionKind, GoalContribution};
pub use error::EngineError;
pub use goals::{Goal, GoalProgress, GoalStatus};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use reports::{CashFlowPoint, CategoryTotal, KindReport, TrendPoint};
pub use transactions::{EntryDirection, Transaction, TransactionKind};

mod accounts;
mod allocations;
mod commands;
mod contributions;
mod error;
mod goals;
mod money;
mod ops;
mod reports;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
