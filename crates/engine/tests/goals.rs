use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    AbandonCmd, ContributeCmd, ContributionKind, Engine, EngineError, GoalStatus, MoneyCents,
    WithdrawCmd,
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

/// Checking account with funds, savings account backing the goal, one goal.
async fn goal_fixture(engine: &Engine, target: i64) -> (Uuid, Uuid, Uuid) {
    let checking = engine
        .new_account("Checking", MoneyCents::new(100_000))
        .await
        .unwrap();
    let savings = engine
        .new_account("Savings", MoneyCents::ZERO)
        .await
        .unwrap();
    let goal = engine
        .new_goal("New bike", MoneyCents::new(target), None, Some(savings))
        .await
        .unwrap();
    (checking, savings, goal)
}

#[tokio::test]
async fn contribute_moves_funds_and_derives_balance() {
    let engine = engine_with_db().await;
    let (checking, savings, goal) = goal_fixture(&engine, 50_000).await;

    let balance = engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(10_000),
            at(2026, 1, 10),
        ))
        .await
        .unwrap();

    assert_eq!(balance, MoneyCents::new(10_000));
    assert_eq!(
        engine.derive_balance(goal).await.unwrap(),
        MoneyCents::new(10_000)
    );
    assert_eq!(
        engine.account(checking).await.unwrap().balance,
        MoneyCents::new(90_000)
    );
    assert_eq!(
        engine.account(savings).await.unwrap().balance,
        MoneyCents::new(10_000)
    );

    let history = engine.contribution_history(goal).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, ContributionKind::Contribution);
    assert_eq!(history[0].amount, MoneyCents::new(10_000));
}

#[tokio::test]
async fn withdraw_consumes_oldest_allocations_first() {
    let engine = engine_with_db().await;
    let (checking, _savings, goal) = goal_fixture(&engine, 50_000).await;

    for (amount, day) in [(100, 1), (50, 2), (30, 3)] {
        engine
            .contribute(ContributeCmd::new(
                goal,
                checking,
                MoneyCents::new(amount),
                at(2026, 2, day),
            ))
            .await
            .unwrap();
    }

    let balance = engine
        .withdraw(WithdrawCmd::new(
            goal,
            checking,
            MoneyCents::new(120),
            at(2026, 2, 10),
        ))
        .await
        .unwrap();
    assert_eq!(balance, MoneyCents::new(60));

    // 100 fully consumed, 50 reduced to 30, the 30 row untouched.
    let allocations = engine.allocations(goal).await.unwrap();
    let amounts: Vec<i64> = allocations.iter().map(|a| a.amount.cents()).collect();
    assert_eq!(amounts, vec![30, 30]);
    assert!(allocations[0].seq < allocations[1].seq);
}

#[tokio::test]
async fn withdraw_beyond_allocation_changes_nothing() {
    let engine = engine_with_db().await;
    let (checking, savings, goal) = goal_fixture(&engine, 50_000).await;

    engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(5_000),
            at(2026, 3, 1),
        ))
        .await
        .unwrap();

    let err = engine
        .withdraw(WithdrawCmd::new(
            goal,
            checking,
            MoneyCents::new(8_000),
            at(2026, 3, 2),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientAllocation {
            goal_id: goal,
            requested_minor: 8_000,
            available_minor: 5_000,
        }
    );

    assert_eq!(
        engine.derive_balance(goal).await.unwrap(),
        MoneyCents::new(5_000)
    );
    assert_eq!(engine.allocations(goal).await.unwrap().len(), 1);
    assert_eq!(
        engine.account(savings).await.unwrap().balance,
        MoneyCents::new(5_000)
    );
}

#[tokio::test]
async fn abandon_refunds_remaining_and_clears_allocations() {
    let engine = engine_with_db().await;
    let (checking, savings, goal) = goal_fixture(&engine, 50_000).await;

    engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(500),
            at(2026, 4, 1),
        ))
        .await
        .unwrap();

    let refunded = engine
        .abandon(
            AbandonCmd::new(goal, "changed plans", at(2026, 4, 15))
                .refund_account_id(checking),
        )
        .await
        .unwrap();

    assert_eq!(refunded, MoneyCents::new(500));
    assert_eq!(engine.derive_balance(goal).await.unwrap(), MoneyCents::ZERO);
    assert!(engine.allocations(goal).await.unwrap().is_empty());
    assert_eq!(
        engine.account(checking).await.unwrap().balance,
        MoneyCents::new(100_000)
    );
    assert_eq!(
        engine.account(savings).await.unwrap().balance,
        MoneyCents::ZERO
    );

    let abandoned = engine.goal(goal).await.unwrap();
    assert_eq!(abandoned.status, GoalStatus::Abandoned);
    assert_eq!(abandoned.abandoned_reason.as_deref(), Some("changed plans"));

    let history = engine.contribution_history(goal).await.unwrap();
    assert_eq!(history.last().unwrap().kind, ContributionKind::Refund);
}

#[tokio::test]
async fn abandon_empty_goal_needs_no_refund_account() {
    let engine = engine_with_db().await;
    let (_checking, _savings, goal) = goal_fixture(&engine, 50_000).await;

    let refunded = engine
        .abandon(AbandonCmd::new(goal, "never started", at(2026, 4, 1)))
        .await
        .unwrap();

    assert_eq!(refunded, MoneyCents::ZERO);
    assert_eq!(
        engine.goal(goal).await.unwrap().status,
        GoalStatus::Abandoned
    );
}

#[tokio::test]
async fn abandon_with_funds_requires_refund_account() {
    let engine = engine_with_db().await;
    let (checking, _savings, goal) = goal_fixture(&engine, 50_000).await;

    engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(500),
            at(2026, 4, 1),
        ))
        .await
        .unwrap();

    let err = engine
        .abandon(AbandonCmd::new(goal, "changed plans", at(2026, 4, 2)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::RefundAccountRequired(goal));

    // Nothing changed: still active, still funded.
    assert_eq!(engine.goal(goal).await.unwrap().status, GoalStatus::Active);
    assert_eq!(
        engine.derive_balance(goal).await.unwrap(),
        MoneyCents::new(500)
    );
}

#[tokio::test]
async fn pause_blocks_contributions_until_resumed() {
    let engine = engine_with_db().await;
    let (checking, _savings, goal) = goal_fixture(&engine, 50_000).await;

    engine.pause_goal(goal).await.unwrap();
    assert_eq!(engine.goal(goal).await.unwrap().status, GoalStatus::Paused);

    let err = engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(100),
            at(2026, 5, 1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Guards are state-specific: pausing twice or resuming an active goal fails.
    assert!(engine.pause_goal(goal).await.is_err());
    engine.resume_goal(goal).await.unwrap();
    assert!(engine.resume_goal(goal).await.is_err());

    engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(100),
            at(2026, 5, 2),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn withdraw_has_no_status_guard() {
    let engine = engine_with_db().await;
    let (checking, _savings, goal) = goal_fixture(&engine, 50_000).await;

    engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(1_000),
            at(2026, 5, 1),
        ))
        .await
        .unwrap();
    engine.pause_goal(goal).await.unwrap();

    // Funds stay reachable on a paused goal.
    let balance = engine
        .withdraw(
            WithdrawCmd::new(goal, checking, MoneyCents::new(400), at(2026, 5, 2))
                .reason("emergency"),
        )
        .await
        .unwrap();
    assert_eq!(balance, MoneyCents::new(600));
}

#[tokio::test]
async fn contribute_validations_reject_before_any_side_effect() {
    let engine = engine_with_db().await;
    let checking = engine
        .new_account("Checking", MoneyCents::new(50))
        .await
        .unwrap();
    let unlinked = engine
        .new_goal("Unlinked", MoneyCents::new(10_000), None, None)
        .await
        .unwrap();

    // No linked account.
    let err = engine
        .contribute(ContributeCmd::new(
            unlinked,
            checking,
            MoneyCents::new(10),
            at(2026, 6, 1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Insufficient funds in the source account.
    let savings = engine
        .new_account("Savings", MoneyCents::ZERO)
        .await
        .unwrap();
    let goal = engine
        .new_goal("Linked", MoneyCents::new(10_000), None, Some(savings))
        .await
        .unwrap();
    let err = engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(100),
            at(2026, 6, 1),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientFunds {
            account_id: checking,
            requested_minor: 100,
            available_minor: 50,
        }
    );
    assert_eq!(engine.derive_balance(goal).await.unwrap(), MoneyCents::ZERO);
    assert!(engine.contribution_history(goal).await.unwrap().is_empty());

    // Non-positive amount.
    let err = engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::ZERO,
            at(2026, 6, 1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn progress_reports_completion_without_persisting_it() {
    let engine = engine_with_db().await;
    let (checking, _savings, goal) = goal_fixture(&engine, 1_000).await;

    engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(1_000),
            at(2026, 7, 1),
        ))
        .await
        .unwrap();

    let progress = engine.goal_progress(goal).await.unwrap();
    assert!(progress.achieved);
    assert_eq!(progress.percent, 100.0);
    assert_eq!(progress.display_status, GoalStatus::Completed);
    // The stored status is untouched: completion is a computed label.
    assert_eq!(progress.status, GoalStatus::Active);
    assert_eq!(engine.goal(goal).await.unwrap().status, GoalStatus::Active);
}

#[tokio::test]
async fn delete_goal_only_without_financial_history() {
    let engine = engine_with_db().await;
    let (checking, _savings, goal) = goal_fixture(&engine, 50_000).await;

    let fresh = engine
        .new_goal("Fresh", MoneyCents::new(100), None, None)
        .await
        .unwrap();
    engine.delete_goal(fresh).await.unwrap();
    assert!(engine.goal(fresh).await.is_err());

    engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(100),
            at(2026, 8, 1),
        ))
        .await
        .unwrap();
    engine
        .withdraw(WithdrawCmd::new(
            goal,
            checking,
            MoneyCents::new(100),
            at(2026, 8, 2),
        ))
        .await
        .unwrap();

    // Zero balance, but the audit trail counts as history.
    let err = engine.delete_goal(goal).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn relink_rejected_once_goal_holds_funds() {
    let engine = engine_with_db().await;
    let (checking, _savings, goal) = goal_fixture(&engine, 50_000).await;
    let other = engine
        .new_account("Other savings", MoneyCents::ZERO)
        .await
        .unwrap();

    engine.link_goal_account(goal, other).await.unwrap();

    engine
        .contribute(ContributeCmd::new(
            goal,
            checking,
            MoneyCents::new(100),
            at(2026, 9, 1),
        ))
        .await
        .unwrap();
    assert!(engine.link_goal_account(goal, checking).await.is_err());
}
