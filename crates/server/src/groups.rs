//! Group API endpoints

use api_types::group::{Group, GroupGet, GroupNew, GroupsGet, GroupsResponse};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Handle requests for creating a new group.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<Json<Group>, ServerError> {
    if payload.name.trim().is_empty() {
        return Err(ServerError::Generic("name required".to_string()));
    }

    let group_id = state
        .engine
        .new_group(
            &payload.name,
            payload.budget,
            &payload.user_id,
            &payload.user_name,
        )
        .await?;

    Ok(Json(Group {
        id: group_id,
        name: payload.name,
        created_by: payload.user_id,
        budget: payload.budget,
    }))
}

/// Handle requests for a single group.
pub async fn get(
    State(state): State<ServerState>,
    Json(payload): Json<GroupGet>,
) -> Result<Json<Group>, ServerError> {
    let group = state.engine.group(&payload.id).await?;

    Ok(Json(Group {
        id: group.id,
        name: group.name,
        created_by: group.created_by,
        budget: group.budget,
    }))
}

/// Handle requests for listing a user's groups.
pub async fn list_for_user(
    State(state): State<ServerState>,
    Json(payload): Json<GroupsGet>,
) -> Result<Json<GroupsResponse>, ServerError> {
    let groups = state.engine.groups_for_user(&payload.user_id).await?;

    Ok(Json(GroupsResponse {
        groups: groups
            .into_iter()
            .map(|group| Group {
                id: group.id,
                name: group.name,
                created_by: group.created_by,
                budget: group.budget,
            })
            .collect(),
    }))
}
