//! Goal API endpoints

use api_types::goal::{
    AbandonNew, AbandonResult, ContributeNew, ContributionView, GoalBalance, GoalCreated,
    GoalHistoryResponse, GoalListResponse, GoalNew, GoalProgressView, GoalStatus as ApiStatus,
    GoalView, WithdrawNew,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{AbandonCmd, ContributeCmd, MoneyCents, WithdrawCmd};

fn map_status(status: engine::GoalStatus) -> ApiStatus {
    match status {
        engine::GoalStatus::Active => ApiStatus::Active,
        engine::GoalStatus::Paused => ApiStatus::Paused,
        engine::GoalStatus::Completed => ApiStatus::Completed,
        engine::GoalStatus::Abandoned => ApiStatus::Abandoned,
    }
}

fn map_contribution_kind(kind: engine::ContributionKind) -> api_types::goal::ContributionKind {
    match kind {
        engine::ContributionKind::Contribution => api_types::goal::ContributionKind::Contribution,
        engine::ContributionKind::Withdrawal => api_types::goal::ContributionKind::Withdrawal,
        engine::ContributionKind::Refund => api_types::goal::ContributionKind::Refund,
    }
}

fn view(goal: engine::Goal) -> GoalView {
    GoalView {
        id: goal.id,
        name: goal.name,
        target_minor: goal.target.cents(),
        deadline: goal.deadline.map(|dt| dt.fixed_offset()),
        status: map_status(goal.status),
        account_id: goal.account_id,
        abandoned_reason: goal.abandoned_reason,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<Json<GoalCreated>, ServerError> {
    let id = state
        .engine
        .new_goal(
            &payload.name,
            MoneyCents::new(payload.target_minor),
            payload.deadline.map(|dt| dt.with_timezone(&Utc)),
            payload.account_id,
        )
        .await?;
    Ok(Json(GoalCreated { id }))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<GoalListResponse>, ServerError> {
    let goals = state.engine.list_goals().await?;
    Ok(Json(GoalListResponse {
        goals: goals.into_iter().map(view).collect(),
    }))
}

pub async fn contribute(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContributeNew>,
) -> Result<Json<GoalBalance>, ServerError> {
    let mut cmd = ContributeCmd::new(
        id,
        payload.source_account_id,
        MoneyCents::new(payload.amount_minor),
        payload.occurred_at.with_timezone(&Utc),
    );
    cmd.meta.note = payload.note;

    let balance = state.engine.contribute(cmd).await?;
    Ok(Json(GoalBalance {
        goal_id: id,
        balance_minor: balance.cents(),
    }))
}

pub async fn withdraw(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WithdrawNew>,
) -> Result<Json<GoalBalance>, ServerError> {
    let mut cmd = WithdrawCmd::new(
        id,
        payload.destination_account_id,
        MoneyCents::new(payload.amount_minor),
        payload.occurred_at.with_timezone(&Utc),
    );
    cmd.reason = payload.reason;

    let balance = state.engine.withdraw(cmd).await?;
    Ok(Json(GoalBalance {
        goal_id: id,
        balance_minor: balance.cents(),
    }))
}

pub async fn abandon(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AbandonNew>,
) -> Result<Json<AbandonResult>, ServerError> {
    let mut cmd = AbandonCmd::new(id, payload.reason, payload.occurred_at.with_timezone(&Utc));
    cmd.refund_account_id = payload.refund_account_id;

    let refunded = state.engine.abandon(cmd).await?;
    Ok(Json(AbandonResult {
        goal_id: id,
        refunded_minor: refunded.cents(),
    }))
}

pub async fn pause(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, ServerError> {
    state.engine.pause_goal(id).await?;
    Ok(Json(()))
}

pub async fn resume(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, ServerError> {
    state.engine.resume_goal(id).await?;
    Ok(Json(()))
}

pub async fn progress(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalProgressView>, ServerError> {
    let progress = state.engine.goal_progress(id).await?;
    Ok(Json(GoalProgressView {
        goal_id: progress.goal_id,
        name: progress.name,
        status: map_status(progress.status),
        display_status: map_status(progress.display_status),
        current_minor: progress.current.cents(),
        target_minor: progress.target.cents(),
        percent: progress.percent,
        achieved: progress.achieved,
    }))
}

pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalHistoryResponse>, ServerError> {
    let entries = state.engine.contribution_history(id).await?;
    Ok(Json(GoalHistoryResponse {
        entries: entries
            .into_iter()
            .map(|entry| ContributionView {
                kind: map_contribution_kind(entry.kind),
                amount_minor: entry.amount.cents(),
                occurred_at: entry.occurred_at.fixed_offset(),
                note: entry.note,
                transaction_id: entry.transaction_id,
            })
            .collect(),
    }))
}
