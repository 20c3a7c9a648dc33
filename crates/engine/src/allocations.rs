//! Goal allocations: the join records between a goal and the ledger rows
//! that funded it.
//!
//! This is the only entity the engine ever updates in place, and only its
//! `amount_minor` (when a withdrawal partially consumes the oldest row).
//! `seq` is monotonic per goal and is the FIFO key.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalAllocation {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub transaction_id: Uuid,
    pub amount: MoneyCents,
    pub seq: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goal_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub goal_id: Uuid,
    pub transaction_id: Uuid,
    pub amount_minor: i64,
    pub seq: i64,
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
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transactions,
}

impl Related<super::goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&GoalAllocation> for ActiveModel {
    fn from(allocation: &GoalAllocation) -> Self {
        Self {
            id: ActiveValue::Set(allocation.id),
            goal_id: ActiveValue::Set(allocation.goal_id),
            transaction_id: ActiveValue::Set(allocation.transaction_id),
            amount_minor: ActiveValue::Set(allocation.amount.cents()),
            seq: ActiveValue::Set(allocation.seq),
        }
    }
}

impl From<Model> for GoalAllocation {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            goal_id: model.goal_id,
            transaction_id: model.transaction_id,
            amount: MoneyCents::new(model.amount_minor),
            seq: model.seq,
        }
    }
}
