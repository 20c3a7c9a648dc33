//! Ledger write operations.
//!
//! Everything here funnels into two primitives executed inside one database
//! transaction: the two-account atomic transfer and the single-account
//! entry. Both insert an append-only `transactions` row and apply the
//! matching balance changes; nothing else in the engine mutates balances.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, EntryCmd, EntryDirection, ExpenseCmd, FeeCmd, IncomeCmd, MoneyCents,
    ResultEngine, Transaction, TransactionKind, TransferCmd, TxMeta, accounts, transactions,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Atomically move funds between two accounts.
    ///
    /// Both balance updates and the ledger row commit as a single durable
    /// unit; on any failure nothing moves. Returns the ledger transaction id.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| { self.transfer_in_tx(&db_tx, &cmd).await })
    }

    /// Transfer primitive composed by the goal orchestration so the fund
    /// movement shares the caller's transaction boundary.
    pub(super) async fn transfer_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &TransferCmd,
    ) -> ResultEngine<Uuid> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::Validation("amount must be > 0".to_string()));
        }
        if cmd.from_account_id == cmd.to_account_id {
            return Err(EngineError::Validation(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }

        let from = self.require_active_account(db_tx, cmd.from_account_id).await?;
        let to = self.require_active_account(db_tx, cmd.to_account_id).await?;

        if from.balance_minor < cmd.amount.cents() {
            return Err(EngineError::InsufficientFunds {
                account_id: cmd.from_account_id,
                requested_minor: cmd.amount.cents(),
                available_minor: from.balance_minor,
            });
        }

        let from_balance = from
            .balance_minor
            .checked_sub(cmd.amount.cents())
            .ok_or_else(|| EngineError::TransferFailed("balance overflow".to_string()))?;
        let to_balance = to
            .balance_minor
            .checked_add(cmd.amount.cents())
            .ok_or_else(|| EngineError::TransferFailed("balance overflow".to_string()))?;

        let tx = Transaction::new(
            TransactionKind::Transfer,
            Some(cmd.from_account_id),
            Some(cmd.to_account_id),
            cmd.amount,
            cmd.meta.occurred_at,
            normalize_optional_text(cmd.meta.category.as_deref()),
            normalize_optional_text(cmd.meta.note.as_deref()),
            cmd.reference.clone(),
        )?;

        transactions::ActiveModel::from(&tx).insert(db_tx).await?;
        self.set_balance(db_tx, cmd.from_account_id, from_balance).await?;
        self.set_balance(db_tx, cmd.to_account_id, to_balance).await?;

        Ok(tx.id)
    }

    /// Record an income entry (credits the account).
    pub async fn income(&self, cmd: IncomeCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.entry_in_tx(
                &db_tx,
                cmd.account_id,
                TransactionKind::Income,
                cmd.amount,
                &cmd.meta,
            )
            .await
        })
    }

    /// Record an expense entry (debits the account).
    pub async fn expense(&self, cmd: ExpenseCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.entry_in_tx(
                &db_tx,
                cmd.account_id,
                TransactionKind::Expense,
                cmd.amount,
                &cmd.meta,
            )
            .await
        })
    }

    /// Record a fee entry (debits the account; reported separately from
    /// expenses).
    pub async fn fee(&self, cmd: FeeCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.entry_in_tx(
                &db_tx,
                cmd.account_id,
                TransactionKind::Fee,
                cmd.amount,
                &cmd.meta,
            )
            .await
        })
    }

    /// Record a single-account entry of an explicit kind (investment
    /// movements, lending, repayments).
    pub async fn record_entry(&self, cmd: EntryCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.entry_in_tx(&db_tx, cmd.account_id, cmd.kind, cmd.amount, &cmd.meta)
                .await
        })
    }

    async fn entry_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        meta: &TxMeta,
    ) -> ResultEngine<Uuid> {
        if !amount.is_positive() {
            return Err(EngineError::Validation("amount must be > 0".to_string()));
        }
        let direction = kind.entry_direction().ok_or_else(|| {
            EngineError::Validation(format!(
                "{} is not a single-account entry kind",
                kind.as_str()
            ))
        })?;

        let account = self.require_active_account(db_tx, account_id).await?;

        // Entries have no overdraft constraint; only transfers (and the goal
        // orchestration on top of them) check balances first.
        let (source, destination, new_balance) = match direction {
            EntryDirection::Inflow => (
                None,
                Some(account_id),
                account.balance_minor.checked_add(amount.cents()),
            ),
            EntryDirection::Outflow => (
                Some(account_id),
                None,
                account.balance_minor.checked_sub(amount.cents()),
            ),
        };
        let new_balance = new_balance
            .ok_or_else(|| EngineError::TransferFailed("balance overflow".to_string()))?;

        let tx = Transaction::new(
            kind,
            source,
            destination,
            amount,
            meta.occurred_at,
            normalize_optional_text(meta.category.as_deref()),
            normalize_optional_text(meta.note.as_deref()),
            None,
        )?;

        transactions::ActiveModel::from(&tx).insert(db_tx).await?;
        self.set_balance(db_tx, account_id, new_balance).await?;

        Ok(tx.id)
    }

    /// Void an earlier transaction by appending a compensating `reversal`
    /// row and undoing its balance effects.
    ///
    /// The original row is never touched; reporting excludes it by matching
    /// the reversal's reference pair.
    pub async fn reverse_transaction(
        &self,
        transaction_id: Uuid,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let original = transactions::Entity::find_by_id(transaction_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

            let original_kind = TransactionKind::try_from(original.kind.as_str())?;
            if original_kind == TransactionKind::Reversal {
                return Err(EngineError::Validation(
                    "a reversal cannot be reversed".to_string(),
                ));
            }

            let reference_kind = format!("{}_reversal", original.kind);
            let already_reversed = transactions::Entity::find()
                .filter(transactions::Column::ReferenceKind.eq(reference_kind.clone()))
                .filter(transactions::Column::ReferenceId.eq(original.reference_id))
                .one(&db_tx)
                .await?;
            if already_reversed.is_some() {
                return Err(EngineError::Validation(
                    "transaction already reversed".to_string(),
                ));
            }

            // Undo the balance effects: whoever lost gets the amount back,
            // whoever gained gives it up. Accounts may have been deactivated
            // since the original movement; corrections still apply.
            if let Some(source_id) = original.source_account_id {
                let account = self.require_account(&db_tx, source_id).await?;
                let restored = account
                    .balance_minor
                    .checked_add(original.amount_minor)
                    .ok_or_else(|| {
                        EngineError::TransferFailed("balance overflow".to_string())
                    })?;
                self.set_balance(&db_tx, source_id, restored).await?;
            }
            if let Some(destination_id) = original.destination_account_id {
                let account = self.require_account(&db_tx, destination_id).await?;
                let restored = account
                    .balance_minor
                    .checked_sub(original.amount_minor)
                    .ok_or_else(|| {
                        EngineError::TransferFailed("balance overflow".to_string())
                    })?;
                self.set_balance(&db_tx, destination_id, restored).await?;
            }

            let reversal = Transaction::new(
                TransactionKind::Reversal,
                original.destination_account_id,
                original.source_account_id,
                MoneyCents::new(original.amount_minor),
                occurred_at,
                original.category.clone(),
                None,
                Some((reference_kind, original.reference_id)),
            )?;
            transactions::ActiveModel::from(&reversal)
                .insert(&db_tx)
                .await?;

            Ok(reversal.id)
        })
    }

    async fn set_balance(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        balance_minor: i64,
    ) -> ResultEngine<()> {
        let update = accounts::ActiveModel {
            id: ActiveValue::Set(account_id),
            balance_minor: ActiveValue::Set(balance_minor),
            ..Default::default()
        };
        update.update(db_tx).await?;
        Ok(())
    }
}
