//! Balance API endpoints

use api_types::balance::{BalanceList, BalanceView, BalancesResponse};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Handle requests for a group's stored balance rows.
pub async fn list(
    State(state): State<ServerState>,
    Json(payload): Json<BalanceList>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state.engine.balances(&payload.group_id).await?;

    Ok(Json(BalancesResponse {
        balances: balances
            .into_iter()
            .map(|balance| BalanceView {
                user_id: balance.user_id,
                user_name: balance.user_name,
                total_paid: balance.total_paid,
                total_owed: balance.total_owed,
                net_balance: balance.net_balance,
            })
            .collect(),
    }))
}
