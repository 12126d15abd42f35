//! Settlement API endpoints

use api_types::settlement::{SettlementGet, SettlementInstruction, SettlementResponse};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Handle requests for a settlement plan.
///
/// The plan is derived fresh from the latest stored balances and never
/// persisted.
pub async fn plan(
    State(state): State<ServerState>,
    Json(payload): Json<SettlementGet>,
) -> Result<Json<SettlementResponse>, ServerError> {
    let instructions = state.engine.settlement_plan(&payload.group_id).await?;

    Ok(Json(SettlementResponse {
        instructions: instructions
            .into_iter()
            .map(|instruction| SettlementInstruction {
                from_user: instruction.from_user,
                from_user_name: instruction.from_user_name,
                to_user: instruction.to_user,
                to_user_name: instruction.to_user_name,
                amount: instruction.amount,
            })
            .collect(),
    }))
}
