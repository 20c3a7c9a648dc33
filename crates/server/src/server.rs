use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{accounts, goals, reports, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Builds the application router. Exposed so integration tests can drive the
/// routes without binding a socket.
pub fn app(state: ServerState) -> Router {
    Router::new()
        .route("/accounts", post(accounts::create).get(accounts::list))
        .route("/accounts/{id}/deactivate", post(accounts::deactivate))
        .route("/accounts/{id}/reactivate", post(accounts::reactivate))
        .route("/income", post(transactions::income_new))
        .route("/expense", post(transactions::expense_new))
        .route("/fee", post(transactions::fee_new))
        .route("/entry", post(transactions::entry_new))
        .route("/transfer", post(transactions::transfer_new))
        .route("/transactions", get(transactions::list))
        .route(
            "/transactions/{id}/reverse",
            post(transactions::reverse),
        )
        .route("/goals", post(goals::create).get(goals::list))
        .route("/goals/{id}/contribute", post(goals::contribute))
        .route("/goals/{id}/withdraw", post(goals::withdraw))
        .route("/goals/{id}/abandon", post(goals::abandon))
        .route("/goals/{id}/pause", post(goals::pause))
        .route("/goals/{id}/resume", post(goals::resume))
        .route("/goals/{id}/progress", get(goals::progress))
        .route("/goals/{id}/history", get(goals::history))
        .route("/reports/by-kind", get(reports::by_kind))
        .route("/reports/categories", get(reports::categories))
        .route("/reports/trend/monthly", get(reports::monthly_trend))
        .route("/reports/trend/yearly", get(reports::yearly_trend))
        .route("/reports/cash-flow", get(reports::cash_flow))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, app(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
