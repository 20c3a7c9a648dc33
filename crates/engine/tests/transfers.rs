use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;

use engine::{
    Engine, EngineError, EntryCmd, ExpenseCmd, FeeCmd, IncomeCmd, MoneyCents, TransactionKind,
    TransactionListFilter, TransferCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn transfer_moves_funds_between_accounts() {
    let engine = engine_with_db().await;
    let cash = engine
        .new_account("Cash", MoneyCents::new(10_000))
        .await
        .unwrap();
    let bank = engine.new_account("Bank", MoneyCents::ZERO).await.unwrap();

    engine
        .transfer(TransferCmd::new(cash, bank, MoneyCents::new(2_500), at(2026, 1, 5)).note("move"))
        .await
        .unwrap();

    assert_eq!(
        engine.account(cash).await.unwrap().balance,
        MoneyCents::new(7_500)
    );
    assert_eq!(
        engine.account(bank).await.unwrap().balance,
        MoneyCents::new(2_500)
    );
}

#[tokio::test]
async fn transfer_rejects_bad_input_without_moving_funds() {
    let engine = engine_with_db().await;
    let cash = engine
        .new_account("Cash", MoneyCents::new(100))
        .await
        .unwrap();
    let bank = engine.new_account("Bank", MoneyCents::ZERO).await.unwrap();

    let err = engine
        .transfer(TransferCmd::new(cash, bank, MoneyCents::new(500), at(2026, 1, 5)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientFunds {
            account_id: cash,
            requested_minor: 500,
            available_minor: 100,
        }
    );

    let err = engine
        .transfer(TransferCmd::new(cash, cash, MoneyCents::new(50), at(2026, 1, 5)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    engine.deactivate_account(bank).await.unwrap();
    let err = engine
        .transfer(TransferCmd::new(cash, bank, MoneyCents::new(50), at(2026, 1, 5)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AccountInactive(bank));

    assert_eq!(
        engine.account(cash).await.unwrap().balance,
        MoneyCents::new(100)
    );
}

#[tokio::test]
async fn entries_credit_and_debit_the_account() {
    let engine = engine_with_db().await;
    let cash = engine.new_account("Cash", MoneyCents::ZERO).await.unwrap();

    engine
        .income(IncomeCmd::new(cash, MoneyCents::new(3_000), at(2026, 2, 1)).category("salary"))
        .await
        .unwrap();
    engine
        .expense(ExpenseCmd::new(cash, MoneyCents::new(800), at(2026, 2, 2)).category("food"))
        .await
        .unwrap();
    engine
        .fee(FeeCmd::new(cash, MoneyCents::new(50), at(2026, 2, 3)).category("bank"))
        .await
        .unwrap();

    assert_eq!(
        engine.account(cash).await.unwrap().balance,
        MoneyCents::new(2_150)
    );
}

#[tokio::test]
async fn expenses_may_overdraw_the_account() {
    let engine = engine_with_db().await;
    let cash = engine
        .new_account("Cash", MoneyCents::new(100))
        .await
        .unwrap();

    engine
        .expense(ExpenseCmd::new(cash, MoneyCents::new(300), at(2026, 2, 1)))
        .await
        .unwrap();

    assert_eq!(
        engine.account(cash).await.unwrap().balance,
        MoneyCents::new(-200)
    );
}

#[tokio::test]
async fn record_entry_follows_the_kind_direction() {
    let engine = engine_with_db().await;
    let broker = engine
        .new_account("Broker", MoneyCents::new(10_000))
        .await
        .unwrap();

    engine
        .record_entry(EntryCmd::new(
            broker,
            TransactionKind::InvestmentDeposit,
            MoneyCents::new(4_000),
            at(2026, 3, 1),
        ))
        .await
        .unwrap();
    engine
        .record_entry(EntryCmd::new(
            broker,
            TransactionKind::InvestmentReturn,
            MoneyCents::new(250),
            at(2026, 3, 20),
        ))
        .await
        .unwrap();

    assert_eq!(
        engine.account(broker).await.unwrap().balance,
        MoneyCents::new(6_250)
    );

    // Two-account kinds are not single-account entries.
    let err = engine
        .record_entry(EntryCmd::new(
            broker,
            TransactionKind::Transfer,
            MoneyCents::new(10),
            at(2026, 3, 21),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn reversal_compensates_without_touching_the_original() {
    let engine = engine_with_db().await;
    let cash = engine.new_account("Cash", MoneyCents::ZERO).await.unwrap();

    let income_id = engine
        .income(IncomeCmd::new(cash, MoneyCents::new(1_000), at(2026, 4, 1)))
        .await
        .unwrap();
    assert_eq!(
        engine.account(cash).await.unwrap().balance,
        MoneyCents::new(1_000)
    );

    engine
        .reverse_transaction(income_id, at(2026, 4, 3))
        .await
        .unwrap();
    assert_eq!(engine.account(cash).await.unwrap().balance, MoneyCents::ZERO);

    // The ledger keeps both rows: the original and the compensating entry.
    let all = engine
        .list_transactions(
            50,
            &TransactionListFilter {
                include_reversals: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|tx| tx.id == income_id));
    let reversal = all
        .iter()
        .find(|tx| tx.kind == TransactionKind::Reversal)
        .unwrap();
    assert_eq!(reversal.reference_kind, "income_reversal");
    assert_eq!(reversal.reference_id, income_id);

    // Reversals are terminal: no double voiding, no reversing a reversal.
    assert!(engine.reverse_transaction(income_id, at(2026, 4, 4)).await.is_err());
    assert!(engine.reverse_transaction(reversal.id, at(2026, 4, 4)).await.is_err());
}

#[tokio::test]
async fn reversing_a_transfer_restores_both_balances() {
    let engine = engine_with_db().await;
    let cash = engine
        .new_account("Cash", MoneyCents::new(5_000))
        .await
        .unwrap();
    let bank = engine.new_account("Bank", MoneyCents::ZERO).await.unwrap();

    let transfer_id = engine
        .transfer(TransferCmd::new(cash, bank, MoneyCents::new(1_200), at(2026, 5, 1)))
        .await
        .unwrap();
    engine
        .reverse_transaction(transfer_id, at(2026, 5, 2))
        .await
        .unwrap();

    assert_eq!(
        engine.account(cash).await.unwrap().balance,
        MoneyCents::new(5_000)
    );
    assert_eq!(engine.account(bank).await.unwrap().balance, MoneyCents::ZERO);
}

#[tokio::test]
async fn account_names_are_unique_while_active() {
    let engine = engine_with_db().await;
    engine
        .new_account("Cash", MoneyCents::ZERO)
        .await
        .unwrap();

    let err = engine.new_account("Cash", MoneyCents::ZERO).await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Cash".to_string()));

    let err = engine
        .new_account("Wallet", MoneyCents::new(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
