//! The goal sub-ledger: allocation rows tying goal funds to ledger
//! transactions.
//!
//! A goal's spendable amount is always the SUM over its allocation rows,
//! recomputed from storage on every read. Withdrawals consume rows oldest
//! first (by `seq`); abandonment clears them after the refund.

use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, Statement,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, GoalAllocation, MoneyCents, ResultEngine, allocations};

use super::{Engine, with_tx};

impl Engine {
    /// Current spendable amount of a goal, derived from its allocation rows.
    ///
    /// Never cached. A negative sum means the allocation rows and the ledger
    /// have drifted apart; it is reported, never clamped.
    pub async fn derive_balance(&self, goal_id: Uuid) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, goal_id).await?;
            self.derive_balance_in_tx(&db_tx, goal_id).await
        })
    }

    pub(super) async fn derive_balance_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
    ) -> ResultEngine<MoneyCents> {
        let stmt = Statement::from_sql_and_values(
            db_tx.get_database_backend(),
            "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
             FROM goal_allocations \
             WHERE goal_id = ?",
            vec![goal_id.into()],
        );
        let row = db_tx.query_one(stmt).await?;
        let total: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);

        if total < 0 {
            tracing::error!(%goal_id, total, "allocation sum is negative");
            return Err(EngineError::DataIntegrity(format!(
                "goal {goal_id} allocation sum is negative ({total})"
            )));
        }
        Ok(MoneyCents::new(total))
    }

    /// Allocation rows of a goal, oldest first.
    pub async fn allocations(&self, goal_id: Uuid) -> ResultEngine<Vec<GoalAllocation>> {
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, goal_id).await?;
            let models = allocations::Entity::find()
                .filter(allocations::Column::GoalId.eq(goal_id))
                .order_by_asc(allocations::Column::Seq)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(GoalAllocation::from).collect())
        })
    }

    /// Insert one allocation row for a successful contribution transfer.
    pub(super) async fn record_allocation(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
        transaction_id: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<Uuid> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "allocation amount must be > 0".to_string(),
            ));
        }

        // MAX+1 inside the write transaction; the storage layer serializes
        // competing writers.
        let stmt = Statement::from_sql_and_values(
            db_tx.get_database_backend(),
            "SELECT COALESCE(MAX(seq), 0) AS max_seq \
             FROM goal_allocations \
             WHERE goal_id = ?",
            vec![goal_id.into()],
        );
        let row = db_tx.query_one(stmt).await?;
        let max_seq: i64 = row.and_then(|r| r.try_get("", "max_seq").ok()).unwrap_or(0);

        let allocation = GoalAllocation {
            id: Uuid::new_v4(),
            goal_id,
            transaction_id,
            amount,
            seq: max_seq + 1,
        };
        allocations::ActiveModel::from(&allocation)
            .insert(db_tx)
            .await?;
        Ok(allocation.id)
    }

    /// Reduce a goal's allocated amount by `amount`, consuming the oldest
    /// rows first.
    ///
    /// Fully covered rows are deleted; the first partially covered row has
    /// its amount reduced in place. All-or-nothing: if `amount` exceeds the
    /// allocated total, nothing is touched. Returns the new derived balance.
    pub(super) async fn consume_fifo(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<MoneyCents> {
        let rows = allocations::Entity::find()
            .filter(allocations::Column::GoalId.eq(goal_id))
            .order_by_asc(allocations::Column::Seq)
            .all(db_tx)
            .await?;

        let total: i64 = rows.iter().map(|row| row.amount_minor).sum();
        if amount.cents() > total {
            return Err(EngineError::InsufficientAllocation {
                goal_id,
                requested_minor: amount.cents(),
                available_minor: total,
            });
        }

        let mut remaining = amount.cents();
        for row in rows {
            if remaining == 0 {
                break;
            }
            if row.amount_minor <= remaining {
                remaining -= row.amount_minor;
                allocations::Entity::delete_by_id(row.id).exec(db_tx).await?;
            } else {
                let reduced = row.amount_minor - remaining;
                remaining = 0;
                let update = allocations::ActiveModel {
                    id: ActiveValue::Set(row.id),
                    amount_minor: ActiveValue::Set(reduced),
                    ..Default::default()
                };
                update.update(db_tx).await?;
            }
        }

        Ok(MoneyCents::new(total - amount.cents()))
    }

    /// Delete all allocation rows of a goal. Idempotent.
    pub(super) async fn clear_allocations(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
    ) -> ResultEngine<()> {
        allocations::Entity::delete_many()
            .filter(allocations::Column::GoalId.eq(goal_id))
            .exec(db_tx)
            .await?;
        Ok(())
    }
}
