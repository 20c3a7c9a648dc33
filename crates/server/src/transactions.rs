//! Ledger API endpoints

use api_types::transaction::{
    EntryKindNew, EntryNew, ReversalNew, TransactionCreated, TransactionKind as ApiKind,
    TransactionList, TransactionListResponse, TransactionView, TransferNew,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{EntryCmd, ExpenseCmd, FeeCmd, IncomeCmd, MoneyCents, TransferCmd};

pub(crate) fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
        engine::TransactionKind::Fee => ApiKind::Fee,
        engine::TransactionKind::InvestmentDeposit => ApiKind::InvestmentDeposit,
        engine::TransactionKind::InvestmentWithdrawal => ApiKind::InvestmentWithdrawal,
        engine::TransactionKind::InvestmentReturn => ApiKind::InvestmentReturn,
        engine::TransactionKind::Lending => ApiKind::Lending,
        engine::TransactionKind::Repayment => ApiKind::Repayment,
        engine::TransactionKind::Reversal => ApiKind::Reversal,
    }
}

pub(crate) fn unmap_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Transfer => engine::TransactionKind::Transfer,
        ApiKind::Fee => engine::TransactionKind::Fee,
        ApiKind::InvestmentDeposit => engine::TransactionKind::InvestmentDeposit,
        ApiKind::InvestmentWithdrawal => engine::TransactionKind::InvestmentWithdrawal,
        ApiKind::InvestmentReturn => engine::TransactionKind::InvestmentReturn,
        ApiKind::Lending => engine::TransactionKind::Lending,
        ApiKind::Repayment => engine::TransactionKind::Repayment,
        ApiKind::Reversal => engine::TransactionKind::Reversal,
    }
}

pub(crate) fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        source_account_id: tx.source_account_id,
        destination_account_id: tx.destination_account_id,
        amount_minor: tx.amount.cents(),
        occurred_at: tx.occurred_at.fixed_offset(),
        category: tx.category,
        note: tx.note,
    }
}

fn apply_meta(mut meta: engine::TxMeta, category: Option<String>, note: Option<String>) -> engine::TxMeta {
    meta.category = category;
    meta.note = note;
    meta
}

pub async fn income_new(
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<Json<TransactionCreated>, ServerError> {
    let mut cmd = IncomeCmd::new(
        payload.account_id,
        MoneyCents::new(payload.amount_minor),
        payload.occurred_at.with_timezone(&Utc),
    );
    cmd.meta = apply_meta(cmd.meta, payload.category, payload.note);
    let id = state.engine.income(cmd).await?;
    Ok(Json(TransactionCreated { id }))
}

pub async fn expense_new(
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<Json<TransactionCreated>, ServerError> {
    let mut cmd = ExpenseCmd::new(
        payload.account_id,
        MoneyCents::new(payload.amount_minor),
        payload.occurred_at.with_timezone(&Utc),
    );
    cmd.meta = apply_meta(cmd.meta, payload.category, payload.note);
    let id = state.engine.expense(cmd).await?;
    Ok(Json(TransactionCreated { id }))
}

pub async fn fee_new(
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<Json<TransactionCreated>, ServerError> {
    let mut cmd = FeeCmd::new(
        payload.account_id,
        MoneyCents::new(payload.amount_minor),
        payload.occurred_at.with_timezone(&Utc),
    );
    cmd.meta = apply_meta(cmd.meta, payload.category, payload.note);
    let id = state.engine.fee(cmd).await?;
    Ok(Json(TransactionCreated { id }))
}

pub async fn entry_new(
    State(state): State<ServerState>,
    Json(payload): Json<EntryKindNew>,
) -> Result<Json<TransactionCreated>, ServerError> {
    let mut cmd = EntryCmd::new(
        payload.account_id,
        unmap_kind(payload.kind),
        MoneyCents::new(payload.amount_minor),
        payload.occurred_at.with_timezone(&Utc),
    );
    cmd.meta = apply_meta(cmd.meta, payload.category, payload.note);
    let id = state.engine.record_entry(cmd).await?;
    Ok(Json(TransactionCreated { id }))
}

pub async fn transfer_new(
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<Json<TransactionCreated>, ServerError> {
    let mut cmd = TransferCmd::new(
        payload.from_account_id,
        payload.to_account_id,
        MoneyCents::new(payload.amount_minor),
        payload.occurred_at.with_timezone(&Utc),
    );
    cmd.meta.note = payload.note;
    let id = state.engine.transfer(cmd).await?;
    Ok(Json(TransactionCreated { id }))
}

pub async fn reverse(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReversalNew>,
) -> Result<Json<TransactionCreated>, ServerError> {
    let occurred_at = payload
        .occurred_at
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let reversal_id = state.engine.reverse_transaction(id, occurred_at).await?;
    Ok(Json(TransactionCreated { id: reversal_id }))
}

pub async fn list(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = engine::TransactionListFilter {
        from: payload.from.map(|dt| dt.with_timezone(&Utc)),
        to: payload.to.map(|dt| dt.with_timezone(&Utc)),
        kinds: payload
            .kinds
            .map(|kinds| kinds.into_iter().map(unmap_kind).collect()),
        account_id: payload.account_id,
        category: payload.category,
        include_reversals: payload.include_reversals.unwrap_or(false),
    };
    let limit = payload.limit.unwrap_or(50);

    let transactions = state.engine.list_transactions(limit, &filter).await?;
    Ok(Json(TransactionListResponse {
        transactions: transactions.into_iter().map(view).collect(),
    }))
}
