//! Reporting API endpoints

use api_types::report::{
    ByKindQuery, CashFlowPointView, CashFlowResponse, CategoryBreakdownResponse,
    CategoryTotalView, KindReportResponse, ReportWindow, TrendPointView, TrendResponse,
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};

use crate::{
    ServerError,
    server::ServerState,
    transactions::{unmap_kind, view},
};

fn window(window: &ReportWindow) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        window.start.with_timezone(&Utc),
        window.end.with_timezone(&Utc),
    )
}

fn map_trend(points: Vec<engine::TrendPoint>) -> TrendResponse {
    TrendResponse {
        points: points
            .into_iter()
            .map(|point| TrendPointView {
                period: point.period,
                income_minor: point.income.cents(),
                expenses_minor: point.expenses.cents(),
                fees_minor: point.fees.cents(),
                savings_minor: point.savings.cents(),
                savings_rate: point.savings_rate,
                income_change_pct: point.income_change_pct,
                expenses_change_pct: point.expenses_change_pct,
                savings_change_pct: point.savings_change_pct,
            })
            .collect(),
    }
}

pub async fn by_kind(
    State(state): State<ServerState>,
    Query(query): Query<ByKindQuery>,
) -> Result<Json<KindReportResponse>, ServerError> {
    let report = state
        .engine
        .transactions_by_kind(
            unmap_kind(query.kind),
            query.start.with_timezone(&Utc),
            query.end.with_timezone(&Utc),
        )
        .await?;
    Ok(Json(KindReportResponse {
        transactions: report.transactions.into_iter().map(view).collect(),
        total_minor: report.total.cents(),
    }))
}

pub async fn categories(
    State(state): State<ServerState>,
    Query(query): Query<ReportWindow>,
) -> Result<Json<CategoryBreakdownResponse>, ServerError> {
    let (start, end) = window(&query);
    let breakdown = state.engine.category_breakdown(start, end).await?;
    Ok(Json(CategoryBreakdownResponse {
        categories: breakdown
            .into_iter()
            .map(|row| CategoryTotalView {
                category: row.category,
                total_minor: row.total.cents(),
                count: row.count,
                average_minor: row.average.cents(),
                percentage: row.percentage,
            })
            .collect(),
    }))
}

pub async fn monthly_trend(
    State(state): State<ServerState>,
    Query(query): Query<ReportWindow>,
) -> Result<Json<TrendResponse>, ServerError> {
    let (start, end) = window(&query);
    let points = state.engine.monthly_trend(start, end).await?;
    Ok(Json(map_trend(points)))
}

pub async fn yearly_trend(
    State(state): State<ServerState>,
    Query(query): Query<ReportWindow>,
) -> Result<Json<TrendResponse>, ServerError> {
    let (start, end) = window(&query);
    let points = state.engine.yearly_trend(start, end).await?;
    Ok(Json(map_trend(points)))
}

pub async fn cash_flow(
    State(state): State<ServerState>,
    Query(query): Query<ReportWindow>,
) -> Result<Json<CashFlowResponse>, ServerError> {
    let (start, end) = window(&query);
    let points = state.engine.cash_flow(start, end).await?;
    Ok(Json(CashFlowResponse {
        points: points
            .into_iter()
            .map(|point| CashFlowPointView {
                date: point.date,
                net_minor: point.net.cents(),
                cumulative_minor: point.cumulative.cents(),
            })
            .collect(),
    }))
}
