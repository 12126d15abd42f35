//! Statistics API endpoints

use api_types::stats::{Statistic, StatsGet};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Handle requests for group statistics.
pub async fn get_stats(
    State(state): State<ServerState>,
    Json(payload): Json<StatsGet>,
) -> Result<Json<Statistic>, ServerError> {
    let stats = state.engine.statistics(&payload.group_id).await?;

    Ok(Json(Statistic {
        total_expenses: stats.total_expenses,
        member_count: stats.member_count,
        per_person_share: stats.per_person_share,
        budget: stats.budget,
        remaining_budget: stats.remaining_budget,
    }))
}
