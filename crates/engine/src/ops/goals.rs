//! Goal lifecycle orchestration.
//!
//! Every mutation here is one database transaction composing the atomic
//! fund transfer, the allocation writes and the audit row, so a failure at
//! any step leaves no partial state behind (no orphaned funds, no orphaned
//! allocations).

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    AbandonCmd, ContributeCmd, ContributionKind, EngineError, Goal, GoalContribution,
    GoalProgress, GoalStatus, MoneyCents, ResultEngine, TransferCmd, WithdrawCmd, allocations,
    contributions, goals,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// Reference kind stamped on every goal-related ledger transfer.
const GOAL_REFERENCE_KIND: &str = "goal";

impl Engine {
    /// Create a new goal and return its id.
    ///
    /// The linked account may be set later, but is mandatory before any fund
    /// movement. Goal names are unique among non-abandoned goals.
    pub async fn new_goal(
        &self,
        name: &str,
        target: MoneyCents,
        deadline: Option<DateTime<Utc>>,
        account_id: Option<Uuid>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "goal name")?;

        with_tx!(self, |db_tx| {
            if let Some(account_id) = account_id {
                self.require_account(&db_tx, account_id).await?;
            }

            let duplicate = goals::Entity::find()
                .filter(goals::Column::Name.eq(name.clone()))
                .filter(goals::Column::Status.ne(GoalStatus::Abandoned.as_str()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::ExistingKey(name));
            }

            let goal = Goal::new(name, target, deadline, account_id)?;
            let id = goal.id;
            goals::ActiveModel::from(&goal).insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// Return a goal by id.
    pub async fn goal(&self, goal_id: Uuid) -> ResultEngine<Goal> {
        let model = goals::Entity::find_by_id(goal_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))?;
        Goal::try_from(model)
    }

    /// List all goals, grouped by status, alphabetical within a group.
    pub async fn list_goals(&self) -> ResultEngine<Vec<Goal>> {
        let models = goals::Entity::find()
            .order_by_asc(goals::Column::Status)
            .order_by_asc(goals::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Goal::try_from).collect()
    }

    /// Link (or relink) the account that physically holds the goal's funds.
    ///
    /// Rejected once the goal holds allocations: moving the backing account
    /// under existing funds would desync the sub-ledger.
    pub async fn link_goal_account(&self, goal_id: Uuid, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal(&db_tx, goal_id).await?;
            self.require_account(&db_tx, account_id).await?;

            let balance = self.derive_balance_in_tx(&db_tx, goal_id).await?;
            if !balance.is_zero() {
                return Err(EngineError::Validation(
                    "cannot relink a goal that holds funds".to_string(),
                ));
            }

            let mut update: goals::ActiveModel = model.into();
            update.account_id = ActiveValue::Set(Some(account_id));
            update.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Contribute funds from an account into a goal.
    ///
    /// Transfers into the goal's linked account and records the matching
    /// allocation plus an audit row, all in one transaction. Returns the new
    /// derived balance.
    pub async fn contribute(&self, cmd: ContributeCmd) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            let goal = self.require_goal(&db_tx, cmd.goal_id).await?;
            let status = GoalStatus::try_from(goal.status.as_str())?;
            if status != GoalStatus::Active {
                return Err(EngineError::Validation(format!(
                    "goal {} is not active",
                    cmd.goal_id
                )));
            }
            let linked_account_id = goal.account_id.ok_or_else(|| {
                EngineError::Validation(format!("goal {} has no linked account", cmd.goal_id))
            })?;
            if !cmd.amount.is_positive() {
                return Err(EngineError::Validation("amount must be > 0".to_string()));
            }

            let mut transfer = TransferCmd::new(
                cmd.source_account_id,
                linked_account_id,
                cmd.amount,
                cmd.meta.occurred_at,
            )
            .reference(GOAL_REFERENCE_KIND, cmd.goal_id);
            transfer.meta.note = cmd.meta.note.clone();
            let transaction_id = self.transfer_in_tx(&db_tx, &transfer).await?;

            self.record_allocation(&db_tx, cmd.goal_id, transaction_id, cmd.amount)
                .await?;
            self.record_audit(
                &db_tx,
                cmd.goal_id,
                ContributionKind::Contribution,
                cmd.amount,
                cmd.meta.occurred_at,
                cmd.meta.note.as_deref(),
                transaction_id,
            )
            .await?;

            self.derive_balance_in_tx(&db_tx, cmd.goal_id).await
        })
    }

    /// Withdraw funds from a goal back into an account.
    ///
    /// Consumes allocations oldest first. Returns the new derived balance.
    pub async fn withdraw(&self, cmd: WithdrawCmd) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            let goal = self.require_goal(&db_tx, cmd.goal_id).await?;
            let linked_account_id = goal.account_id.ok_or_else(|| {
                EngineError::Validation(format!("goal {} has no linked account", cmd.goal_id))
            })?;
            if !cmd.amount.is_positive() {
                return Err(EngineError::Validation("amount must be > 0".to_string()));
            }

            let available = self.derive_balance_in_tx(&db_tx, cmd.goal_id).await?;
            if cmd.amount > available {
                return Err(EngineError::InsufficientAllocation {
                    goal_id: cmd.goal_id,
                    requested_minor: cmd.amount.cents(),
                    available_minor: available.cents(),
                });
            }

            // The transfer re-checks the linked account's balance, which
            // guards against allocation/ledger drift.
            let mut transfer = TransferCmd::new(
                linked_account_id,
                cmd.destination_account_id,
                cmd.amount,
                cmd.meta.occurred_at,
            )
            .reference(GOAL_REFERENCE_KIND, cmd.goal_id);
            transfer.meta.note = normalize_optional_text(cmd.reason.as_deref());
            let transaction_id = self.transfer_in_tx(&db_tx, &transfer).await?;

            self.record_audit(
                &db_tx,
                cmd.goal_id,
                ContributionKind::Withdrawal,
                cmd.amount,
                cmd.meta.occurred_at,
                cmd.reason.as_deref(),
                transaction_id,
            )
            .await?;

            self.consume_fifo(&db_tx, cmd.goal_id, cmd.amount).await
        })
    }

    /// Abandon a goal, refunding whatever it still holds.
    ///
    /// A refund account is required whenever the derived balance is positive.
    /// Returns the refunded amount (zero when the goal was empty).
    pub async fn abandon(&self, cmd: AbandonCmd) -> ResultEngine<MoneyCents> {
        let reason = normalize_required_name(&cmd.reason, "abandon reason")?;

        with_tx!(self, |db_tx| {
            let goal = self.require_goal(&db_tx, cmd.goal_id).await?;
            let status = GoalStatus::try_from(goal.status.as_str())?;
            if status != GoalStatus::Active {
                return Err(EngineError::Validation(format!(
                    "goal {} is not active",
                    cmd.goal_id
                )));
            }

            let remaining = self.derive_balance_in_tx(&db_tx, cmd.goal_id).await?;
            if remaining.is_positive() {
                let refund_account_id = cmd
                    .refund_account_id
                    .ok_or(EngineError::RefundAccountRequired(cmd.goal_id))?;
                let linked_account_id = goal.account_id.ok_or_else(|| {
                    EngineError::Validation(format!("goal {} has no linked account", cmd.goal_id))
                })?;

                let transfer = TransferCmd::new(
                    linked_account_id,
                    refund_account_id,
                    remaining,
                    cmd.meta.occurred_at,
                )
                .reference(GOAL_REFERENCE_KIND, cmd.goal_id)
                .note("abandon-refund");
                let transaction_id = self.transfer_in_tx(&db_tx, &transfer).await?;

                self.record_audit(
                    &db_tx,
                    cmd.goal_id,
                    ContributionKind::Refund,
                    remaining,
                    cmd.meta.occurred_at,
                    Some(reason.as_str()),
                    transaction_id,
                )
                .await?;
            }

            self.clear_allocations(&db_tx, cmd.goal_id).await?;

            let mut update: goals::ActiveModel = goal.into();
            update.status = ActiveValue::Set(GoalStatus::Abandoned.as_str().to_string());
            update.abandoned_reason = ActiveValue::Set(Some(reason));
            update.update(&db_tx).await?;

            Ok(remaining)
        })
    }

    /// Pause an active goal. Pure status flip, no fund movement.
    pub async fn pause_goal(&self, goal_id: Uuid) -> ResultEngine<()> {
        self.flip_status(goal_id, GoalStatus::Active, GoalStatus::Paused)
            .await
    }

    /// Resume a paused goal.
    pub async fn resume_goal(&self, goal_id: Uuid) -> ResultEngine<()> {
        self.flip_status(goal_id, GoalStatus::Paused, GoalStatus::Active)
            .await
    }

    async fn flip_status(
        &self,
        goal_id: Uuid,
        expected: GoalStatus,
        next: GoalStatus,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let goal = self.require_goal(&db_tx, goal_id).await?;
            let status = GoalStatus::try_from(goal.status.as_str())?;
            if status != expected {
                return Err(EngineError::Validation(format!(
                    "goal {goal_id} is not {}",
                    expected.as_str()
                )));
            }
            let mut update: goals::ActiveModel = goal.into();
            update.status = ActiveValue::Set(next.as_str().to_string());
            update.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Read-time progress snapshot: derived balance against the target.
    ///
    /// Completion is a computed label here; the persisted status is never
    /// flipped by a contribution.
    pub async fn goal_progress(&self, goal_id: Uuid) -> ResultEngine<GoalProgress> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal(&db_tx, goal_id).await?;
            let goal = Goal::try_from(model)?;
            let current = self.derive_balance_in_tx(&db_tx, goal_id).await?;

            let achieved = current >= goal.target;
            let percent = if goal.target.is_positive() {
                100.0 * current.cents() as f64 / goal.target.cents() as f64
            } else {
                0.0
            };
            let display_status = if achieved && goal.status == GoalStatus::Active {
                GoalStatus::Completed
            } else {
                goal.status
            };

            Ok(GoalProgress {
                goal_id,
                name: goal.name,
                status: goal.status,
                display_status,
                current,
                target: goal.target,
                percent,
                achieved,
            })
        })
    }

    /// Audit trail of a goal's fund movements, oldest first.
    pub async fn contribution_history(
        &self,
        goal_id: Uuid,
    ) -> ResultEngine<Vec<GoalContribution>> {
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, goal_id).await?;
            let models = contributions::Entity::find()
                .filter(contributions::Column::GoalId.eq(goal_id))
                .order_by_asc(contributions::Column::OccurredAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(GoalContribution::try_from).collect()
        })
    }

    /// Delete a goal that never saw money.
    ///
    /// A goal with any financial history (allocation rows now, or audit rows
    /// ever) is kept; abandon it instead.
    pub async fn delete_goal(&self, goal_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, goal_id).await?;

            let allocation_count = allocations::Entity::find()
                .filter(allocations::Column::GoalId.eq(goal_id))
                .count(&db_tx)
                .await?;
            let audit_count = contributions::Entity::find()
                .filter(contributions::Column::GoalId.eq(goal_id))
                .count(&db_tx)
                .await?;
            if allocation_count > 0 || audit_count > 0 {
                return Err(EngineError::Validation(format!(
                    "goal {goal_id} has financial history and cannot be deleted"
                )));
            }

            goals::Entity::delete_by_id(goal_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    pub(super) async fn require_goal(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
    ) -> ResultEngine<goals::Model> {
        goals::Entity::find_by_id(goal_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))
    }

    async fn record_audit(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
        kind: ContributionKind,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
        note: Option<&str>,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        let record = GoalContribution {
            id: Uuid::new_v4(),
            goal_id,
            kind,
            amount,
            occurred_at,
            note: normalize_optional_text(note),
            transaction_id,
        };
        contributions::ActiveModel::from(&record).insert(db_tx).await?;
        Ok(())
    }
}
