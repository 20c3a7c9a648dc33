//! Ledger transaction primitives.
//!
//! A `Transaction` is an immutable, append-only record of a fund movement.
//! Rows are never updated or deleted; a correction is a **new** row of kind
//! [`TransactionKind::Reversal`] whose reference pair points back at the
//! voided entry.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

/// Which side of an account a pure (single-account) entry touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryDirection {
    Inflow,
    Outflow,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
            Self::Fee => "fee",
            Self::InvestmentDeposit => "investment_deposit",
            Self::InvestmentWithdrawal => "investment_withdrawal",
            Self::InvestmentReturn => "investment_return",
            Self::Lending => "lending",
            Self::Repayment => "repayment",
            Self::Reversal => "reversal",
        }
    }

    /// Direction of a single-account entry of this kind, or `None` for the
    /// two-account and compensating kinds.
    pub fn entry_direction(self) -> Option<EntryDirection> {
        match self {
            Self::Income | Self::InvestmentWithdrawal | Self::InvestmentReturn | Self::Repayment => {
                Some(EntryDirection::Inflow)
            }
            Self::Expense | Self::Fee | Self::InvestmentDeposit | Self::Lending => {
                Some(EntryDirection::Outflow)
            }
            Self::Transfer | Self::Reversal => None,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            "fee" => Ok(Self::Fee),
            "investment_deposit" => Ok(Self::InvestmentDeposit),
            "investment_withdrawal" => Ok(Self::InvestmentWithdrawal),
            "investment_return" => Ok(Self::InvestmentReturn),
            "lending" => Ok(Self::Lending),
            "repayment" => Ok(Self::Repayment),
            "reversal" => Ok(Self::Reversal),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub source_account_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub occurred_at: DateTime<Utc>,
    pub category: Option<String>,
    pub note: Option<String>,
    /// The domain event that caused this row. Pure entries reference
    /// themselves (`kind`, own id); goal transfers reference (`goal`,
    /// goal id); reversals reference (`<kind>_reversal`, voided reference).
    pub reference_kind: String,
    pub reference_id: Uuid,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        source_account_id: Option<Uuid>,
        destination_account_id: Option<Uuid>,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
        category: Option<String>,
        note: Option<String>,
        reference: Option<(String, Uuid)>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "amount must be > 0".to_string(),
            ));
        }
        if source_account_id.is_none() && destination_account_id.is_none() {
            return Err(EngineError::Validation(
                "a transaction must touch at least one account".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        // Absent an explicit domain event, the row is its own: the resolver
        // relies on reference ids of pure entries matching row ids.
        let (reference_kind, reference_id) =
            reference.unwrap_or_else(|| (kind.as_str().to_string(), id));

        Ok(Self {
            id,
            source_account_id,
            destination_account_id,
            kind,
            amount,
            occurred_at,
            category,
            note,
            reference_kind,
            reference_id,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub source_account_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    pub kind: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub category: Option<String>,
    pub note: Option<String>,
    pub reference_kind: String,
    pub reference_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::allocations::Entity")]
    Allocations,
}

impl Related<super::allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            source_account_id: ActiveValue::Set(tx.source_account_id),
            destination_account_id: ActiveValue::Set(tx.destination_account_id),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            category: ActiveValue::Set(tx.category.clone()),
            note: ActiveValue::Set(tx.note.clone()),
            reference_kind: ActiveValue::Set(tx.reference_kind.clone()),
            reference_id: ActiveValue::Set(tx.reference_id),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            source_account_id: model.source_account_id,
            destination_account_id: model.destination_account_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            occurred_at: model.occurred_at,
            category: model.category,
            note: model.note,
            reference_kind: model.reference_kind,
            reference_id: model.reference_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_storage_strings() {
        for kind in [
            TransactionKind::Income,
            TransactionKind::Expense,
            TransactionKind::Transfer,
            TransactionKind::Fee,
            TransactionKind::InvestmentDeposit,
            TransactionKind::InvestmentWithdrawal,
            TransactionKind::InvestmentReturn,
            TransactionKind::Lending,
            TransactionKind::Repayment,
            TransactionKind::Reversal,
        ] {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionKind::try_from("refund").is_err());
    }

    #[test]
    fn pure_entries_reference_themselves() {
        let tx = Transaction::new(
            TransactionKind::Income,
            None,
            Some(Uuid::new_v4()),
            MoneyCents::new(1000),
            Utc::now(),
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(tx.reference_kind, "income");
        assert_eq!(tx.reference_id, tx.id);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let err = Transaction::new(
            TransactionKind::Expense,
            Some(Uuid::new_v4()),
            None,
            MoneyCents::ZERO,
            Utc::now(),
            None,
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err, EngineError::Validation("amount must be > 0".to_string()));
    }
}
