use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::api::auth::AuthUser;
use crate::api::types::{ApiResponse, DataContent, MemberDto, MessageDto};

#[derive(Deserialize)]
pub struct AddMemberRequest {
    pub community: String,
    pub user: String,
    pub role: String,
}

fn parse_id(field: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("Invalid {field} id: {raw}")))
}

/// POST /v1/member
/// Add a user to a community with a role.
pub async fn add(
    State(state): State<Arc<AppState>>,
    AuthUser(acting_user_id): AuthUser,
    Json(payload): Json<AddMemberRequest>,
) -> Result<Json<ApiResponse<DataContent<MemberDto>>>, ApiError> {
    let community_id = parse_id("community", &payload.community)?;
    let user_id = parse_id("user", &payload.user)?;
    let role_id = parse_id("role", &payload.role)?;

    let member = state
        .members
        .add(acting_user_id, community_id, user_id, role_id)
        .await?;

    Ok(Json(ApiResponse::success(DataContent {
        data: MemberDto::from(member),
    })))
}

/// DELETE /v1/member/{id}
/// Remove a membership; requires an elevated role in the same community.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(acting_user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DataContent<MessageDto>>>, ApiError> {
    let member_id = parse_id("member", &id)?;

    state.members.remove(acting_user_id, member_id).await?;

    Ok(Json(ApiResponse::success(DataContent {
        data: MessageDto {
            message: "Member removed successfully".to_string(),
        },
    })))
}
