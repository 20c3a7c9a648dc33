//! Command structs for engine operations.
//!
//! These types group parameters for write operations (entries, transfers,
//! goal lifecycle), keeping call sites readable and avoiding long argument
//! lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{MoneyCents, TransactionKind};

/// Common metadata for transaction creation.
#[derive(Clone, Debug)]
pub struct TxMeta {
    pub category: Option<String>,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TxMeta {
    #[must_use]
    pub fn new(occurred_at: DateTime<Utc>) -> Self {
        Self {
            category: None,
            note: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Create an income entry (increases the account).
#[derive(Clone, Debug)]
pub struct IncomeCmd {
    pub account_id: Uuid,
    pub amount: MoneyCents,
    pub meta: TxMeta,
}

impl IncomeCmd {
    #[must_use]
    pub fn new(account_id: Uuid, amount: MoneyCents, occurred_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            amount,
            meta: TxMeta::new(occurred_at),
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.meta.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }
}

/// Create an expense entry (decreases the account).
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub account_id: Uuid,
    pub amount: MoneyCents,
    pub meta: TxMeta,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(account_id: Uuid, amount: MoneyCents, occurred_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            amount,
            meta: TxMeta::new(occurred_at),
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.meta.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }
}

/// Create a fee entry (decreases the account; reported separately from
/// expenses).
#[derive(Clone, Debug)]
pub struct FeeCmd {
    pub account_id: Uuid,
    pub amount: MoneyCents,
    pub meta: TxMeta,
}

impl FeeCmd {
    #[must_use]
    pub fn new(account_id: Uuid, amount: MoneyCents, occurred_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            amount,
            meta: TxMeta::new(occurred_at),
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.meta.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }
}

/// Create a single-account entry of an explicit kind (investment movements,
/// lending, repayments). The kind decides whether the account is credited or
/// debited.
#[derive(Clone, Debug)]
pub struct EntryCmd {
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub meta: TxMeta,
}

impl EntryCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            kind,
            amount,
            meta: TxMeta::new(occurred_at),
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.meta.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }
}

/// Move funds atomically between two accounts.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: MoneyCents,
    pub meta: TxMeta,
    /// Domain event behind the movement; defaults to the transfer itself.
    pub reference: Option<(String, Uuid)>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            meta: TxMeta::new(occurred_at),
            reference: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn reference(mut self, kind: impl Into<String>, id: Uuid) -> Self {
        self.reference = Some((kind.into(), id));
        self
    }
}

/// Contribute funds from an account into a goal.
#[derive(Clone, Debug)]
pub struct ContributeCmd {
    pub goal_id: Uuid,
    pub source_account_id: Uuid,
    pub amount: MoneyCents,
    pub meta: TxMeta,
}

impl ContributeCmd {
    #[must_use]
    pub fn new(
        goal_id: Uuid,
        source_account_id: Uuid,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            goal_id,
            source_account_id,
            amount,
            meta: TxMeta::new(occurred_at),
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }
}

/// Withdraw funds from a goal back into an account.
#[derive(Clone, Debug)]
pub struct WithdrawCmd {
    pub goal_id: Uuid,
    pub destination_account_id: Uuid,
    pub amount: MoneyCents,
    pub reason: Option<String>,
    pub meta: TxMeta,
}

impl WithdrawCmd {
    #[must_use]
    pub fn new(
        goal_id: Uuid,
        destination_account_id: Uuid,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            goal_id,
            destination_account_id,
            amount,
            reason: None,
            meta: TxMeta::new(occurred_at),
        }
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Abandon a goal, refunding any remaining funds.
#[derive(Clone, Debug)]
pub struct AbandonCmd {
    pub goal_id: Uuid,
    pub reason: String,
    /// Required whenever the goal still holds funds.
    pub refund_account_id: Option<Uuid>,
    pub meta: TxMeta,
}

impl AbandonCmd {
    #[must_use]
    pub fn new(goal_id: Uuid, reason: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            goal_id,
            reason: reason.into(),
            refund_account_id: None,
            meta: TxMeta::new(occurred_at),
        }
    }

    #[must_use]
    pub fn refund_account_id(mut self, account_id: Uuid) -> Self {
        self.refund_account_id = Some(account_id);
        self
    }
}
