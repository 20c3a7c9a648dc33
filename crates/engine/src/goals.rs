//! Savings goals.
//!
//! A goal is a *virtual* target: it never stores a balance. Its spendable
//! amount is always derived from the allocation rows tied to the ledger
//! (see [`crate::GoalAllocation`]).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }
}

impl TryFrom<&str> for GoalStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "abandoned" => Ok(Self::Abandoned),
            other => Err(EngineError::Validation(format!(
                "invalid goal status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub target: MoneyCents,
    pub deadline: Option<DateTime<Utc>>,
    pub status: GoalStatus,
    /// Account that physically holds contributed funds. Must be set before
    /// any fund movement.
    pub account_id: Option<Uuid>,
    pub abandoned_reason: Option<String>,
}

impl Goal {
    pub fn new(
        name: String,
        target: MoneyCents,
        deadline: Option<DateTime<Utc>>,
        account_id: Option<Uuid>,
    ) -> ResultEngine<Self> {
        if !target.is_positive() {
            return Err(EngineError::Validation(
                "goal target must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            target,
            deadline,
            status: GoalStatus::Active,
            account_id,
            abandoned_reason: None,
        })
    }
}

/// Read-time progress snapshot.
///
/// `display_status` reports `Completed` once the derived balance reaches the
/// target; the persisted status is never flipped by a contribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub name: String,
    pub status: GoalStatus,
    pub display_status: GoalStatus,
    pub current: MoneyCents,
    pub target: MoneyCents,
    pub percent: f64,
    pub achieved: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub target_minor: i64,
    pub deadline: Option<DateTimeUtc>,
    pub status: String,
    pub account_id: Option<Uuid>,
    pub abandoned_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
    #[sea_orm(has_many = "super::allocations::Entity")]
    Allocations,
    #[sea_orm(has_many = "super::contributions::Entity")]
    Contributions,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Goal> for ActiveModel {
    fn from(goal: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id),
            name: ActiveValue::Set(goal.name.clone()),
            target_minor: ActiveValue::Set(goal.target.cents()),
            deadline: ActiveValue::Set(goal.deadline),
            status: ActiveValue::Set(goal.status.as_str().to_string()),
            account_id: ActiveValue::Set(goal.account_id),
            abandoned_reason: ActiveValue::Set(goal.abandoned_reason.clone()),
        }
    }
}

impl TryFrom<Model> for Goal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            target: MoneyCents::new(model.target_minor),
            deadline: model.deadline,
            status: GoalStatus::try_from(model.status.as_str())?,
            account_id: model.account_id,
            abandoned_reason: model.abandoned_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [
            GoalStatus::Active,
            GoalStatus::Paused,
            GoalStatus::Completed,
            GoalStatus::Abandoned,
        ] {
            assert_eq!(GoalStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(GoalStatus::try_from("done").is_err());
    }

    #[test]
    fn new_goal_rejects_non_positive_target() {
        assert!(Goal::new("Bike".to_string(), MoneyCents::ZERO, None, None).is_err());
    }
}
