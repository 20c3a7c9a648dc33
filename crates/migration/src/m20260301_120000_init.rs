use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    BalanceMinor,
    Active,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    SourceAccountId,
    DestinationAccountId,
    Kind,
    AmountMinor,
    OccurredAt,
    Category,
    Note,
    ReferenceKind,
    ReferenceId,
}

#[derive(Iden)]
pub(crate) enum Goals {
    Table,
    Id,
    Name,
    TargetMinor,
    Deadline,
    Status,
    AccountId,
    AbandonedReason,
}

#[derive(Iden)]
enum GoalAllocations {
    Table,
    Id,
    GoalId,
    TransactionId,
    AmountMinor,
    Seq,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::SourceAccountId).uuid())
                    .col(ColumnDef::new(Transactions::DestinationAccountId).uuid())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string())
                    .col(ColumnDef::new(Transactions::Note).string())
                    .col(
                        ColumnDef::new(Transactions::ReferenceKind)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::ReferenceId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-source_account_id")
                            .from(Transactions::Table, Transactions::SourceAccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-destination_account_id")
                            .from(Transactions::Table, Transactions::DestinationAccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-kind-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::Kind)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-reference")
                    .table(Transactions::Table)
                    .col(Transactions::ReferenceKind)
                    .col(Transactions::ReferenceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Goals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Goals::Name).string().not_null())
                    .col(
                        ColumnDef::new(Goals::TargetMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Goals::Deadline).timestamp())
                    .col(ColumnDef::new(Goals::Status).string().not_null())
                    .col(ColumnDef::new(Goals::AccountId).uuid())
                    .col(ColumnDef::new(Goals::AbandonedReason).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goals-account_id")
                            .from(Goals::Table, Goals::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GoalAllocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoalAllocations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GoalAllocations::GoalId).uuid().not_null())
                    .col(
                        ColumnDef::new(GoalAllocations::TransactionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoalAllocations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GoalAllocations::Seq).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_allocations-goal_id")
                            .from(GoalAllocations::Table, GoalAllocations::GoalId)
                            .to(Goals::Table, Goals::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_allocations-transaction_id")
                            .from(GoalAllocations::Table, GoalAllocations::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goal_allocations-goal_id-seq")
                    .table(GoalAllocations::Table)
                    .col(GoalAllocations::GoalId)
                    .col(GoalAllocations::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // A ledger transaction funds at most one allocation.
        manager
            .create_index(
                Index::create()
                    .name("idx-goal_allocations-transaction_id")
                    .table(GoalAllocations::Table)
                    .col(GoalAllocations::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GoalAllocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
