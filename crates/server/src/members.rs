//! Membership API endpoints

use api_types::member::{MemberJoin, MemberList, MemberView, MembersResponse};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Handle requests for joining a group.
pub async fn join(
    State(state): State<ServerState>,
    Json(payload): Json<MemberJoin>,
) -> Result<Json<MemberView>, ServerError> {
    state
        .engine
        .join_group(&payload.group_id, &payload.user_id, &payload.user_name)
        .await?;

    Ok(Json(MemberView {
        user_id: payload.user_id,
        user_name: payload.user_name,
    }))
}

/// Handle requests for listing a group's members.
pub async fn list(
    State(state): State<ServerState>,
    Json(payload): Json<MemberList>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state.engine.members(&payload.group_id).await?;

    Ok(Json(MembersResponse {
        members: members
            .into_iter()
            .map(|member| MemberView {
                user_id: member.user_id,
                user_name: member.user_name,
            })
            .collect(),
    }))
}
