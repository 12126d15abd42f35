use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod balances;
mod expenses;
mod groups;
mod members;
mod server;
mod settlements;
mod statistics;

/// Request and response payloads for every route, re-exported so HTTP
/// clients can depend on `server` alone instead of reaching into
/// `api_types` directly.
pub mod types {
    pub mod group {
        pub use api_types::group::{Group, GroupGet, GroupNew, GroupsGet, GroupsResponse};
    }

    pub mod member {
        pub use api_types::member::{MemberJoin, MemberList, MemberView, MembersResponse};
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseCreated, ExpenseDelete, ExpenseList, ExpenseNew, ExpenseView,
            ExpensesResponse,
        };
    }

    pub mod balance {
        pub use api_types::balance::{BalanceList, BalanceView, BalancesResponse};
    }

    pub mod settlement {
        pub use api_types::settlement::{
            SettlementGet, SettlementInstruction, SettlementResponse,
        };
    }

    pub mod stats {
        pub use api_types::stats::{Statistic, StatsGet};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
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
