//! Account API endpoints

use api_types::account::{AccountCreated, AccountNew, AccountView};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::MoneyCents;

fn view(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        balance_minor: account.balance.cents(),
        active: account.active,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<Json<AccountCreated>, ServerError> {
    let id = state
        .engine
        .new_account(&payload.name, MoneyCents::new(payload.opening_balance_minor))
        .await?;
    Ok(Json(AccountCreated { id }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub include_inactive: Option<bool>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state
        .engine
        .list_accounts(query.include_inactive.unwrap_or(false))
        .await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, ServerError> {
    state.engine.deactivate_account(id).await?;
    Ok(Json(()))
}

pub async fn reactivate(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, ServerError> {
    state.engine.reactivate_account(id).await?;
    Ok(Json(()))
}
