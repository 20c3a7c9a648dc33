//! Audit trail for goal fund movements.
//!
//! Rows are write-once and purely observational: balances are never computed
//! from them. They answer "what happened to this goal and when".

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    Contribution,
    Withdrawal,
    Refund,
}

impl ContributionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contribution => "contribution",
            Self::Withdrawal => "withdrawal",
            Self::Refund => "refund",
        }
    }
}

impl TryFrom<&str> for ContributionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "contribution" => Ok(Self::Contribution),
            "withdrawal" => Ok(Self::Withdrawal),
            "refund" => Ok(Self::Refund),
            other => Err(EngineError::Validation(format!(
                "invalid contribution kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalContribution {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub kind: ContributionKind,
    pub amount: MoneyCents,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub transaction_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goal_contributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub goal_id: Uuid,
    pub kind: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub note: Option<String>,
    pub transaction_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::goals::Entity",
        from = "Column::GoalId",
        to = "super::goals::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Goals,
}

impl Related<super::goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&GoalContribution> for ActiveModel {
    fn from(record: &GoalContribution) -> Self {
        Self {
            id: ActiveValue::Set(record.id),
            goal_id: ActiveValue::Set(record.goal_id),
            kind: ActiveValue::Set(record.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(record.amount.cents()),
            occurred_at: ActiveValue::Set(record.occurred_at),
            note: ActiveValue::Set(record.note.clone()),
            transaction_id: ActiveValue::Set(record.transaction_id),
        }
    }
}

impl TryFrom<Model> for GoalContribution {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            goal_id: model.goal_id,
            kind: ContributionKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            occurred_at: model.occurred_at,
            note: model.note,
            transaction_id: model.transaction_id,
        })
    }
}
