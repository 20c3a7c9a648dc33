use sea_orm_migration::prelude::*;

use crate::m20260301_120000_init::Goals;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum GoalContributions {
    Table,
    Id,
    GoalId,
    Kind,
    AmountMinor,
    OccurredAt,
    Note,
    TransactionId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GoalContributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoalContributions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GoalContributions::GoalId).uuid().not_null())
                    .col(ColumnDef::new(GoalContributions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(GoalContributions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoalContributions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GoalContributions::Note).string())
                    .col(
                        ColumnDef::new(GoalContributions::TransactionId)
                            .uuid()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_contributions-goal_id")
                            .from(GoalContributions::Table, GoalContributions::GoalId)
                            .to(Goals::Table, Goals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goal_contributions-goal_id")
                    .table(GoalContributions::Table)
                    .col(GoalContributions::GoalId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GoalContributions::Table).to_owned())
            .await?;
        Ok(())
    }
}
