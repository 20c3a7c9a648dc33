use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, app, run, run_with_listener, spawn_with_listener};

mod accounts;
mod goals;
mod reports;
mod server;
mod transactions;

pub mod types {
    pub mod account {
        pub use api_types::account::{AccountCreated, AccountNew, AccountView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            EntryKindNew, EntryNew, ReversalNew, TransactionCreated, TransactionKind,
            TransactionList, TransactionListResponse, TransactionView, TransferNew,
        };
    }

    pub mod goal {
        pub use api_types::goal::{
            AbandonNew, AbandonResult, ContributeNew, ContributionView, GoalBalance, GoalCreated,
            GoalHistoryResponse, GoalListResponse, GoalNew, GoalProgressView, GoalStatus,
            GoalView, WithdrawNew,
        };
    }

    pub mod report {
        pub use api_types::report::{
            ByKindQuery, CashFlowPointView, CashFlowResponse, CategoryBreakdownResponse,
            CategoryTotalView, KindReportResponse, ReportWindow, TrendPointView, TrendResponse,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::DataIntegrity(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::Validation(_)
        | EngineError::InsufficientFunds { .. }
        | EngineError::InsufficientAllocation { .. }
        | EngineError::AccountInactive(_)
        | EngineError::TransferFailed(_)
        | EngineError::RefundAccountRequired(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::DataIntegrity(message) => {
            tracing::error!("data integrity violation: {message}");
            format!("data integrity violation: {message}")
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn insufficient_allocation_maps_to_422() {
        let res = ServerError::from(EngineError::InsufficientAllocation {
            goal_id: Uuid::new_v4(),
            requested_minor: 100,
            available_minor: 50,
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn data_integrity_maps_to_500() {
        let res =
            ServerError::from(EngineError::DataIntegrity("drift".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
