use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::api::auth::AuthUser;
use crate::api::types::{
    ApiResponse, CommunityDto, CommunityWithOwnerDto, DEFAULT_PAGE_SIZE, DataContent,
    MemberDetailDto, PageQuery, PagedContent,
};

#[derive(Deserialize)]
pub struct CreateCommunityRequest {
    pub name: String,
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("Invalid id: {raw}")))
}

/// POST /v1/community
/// Create a community; the caller becomes owner and gets the admin membership.
pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Json(payload): Json<CreateCommunityRequest>,
) -> Result<Json<ApiResponse<DataContent<CommunityDto>>>, ApiError> {
    let community = state.communities.create(owner_id, &payload.name).await?;

    Ok(Json(ApiResponse::success(DataContent {
        data: CommunityDto::from(community),
    })))
}

/// GET /v1/community?page=
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<PagedContent<CommunityWithOwnerDto>>>, ApiError> {
    let page = state
        .communities
        .list(query.page(), DEFAULT_PAGE_SIZE)
        .await?;

    Ok(Json(ApiResponse::success(PagedContent::from_page(
        page,
        CommunityWithOwnerDto::from,
    ))))
}

/// GET /v1/community/{id}/members?page&pageSize
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<PagedContent<MemberDetailDto>>>, ApiError> {
    let community_id = parse_id(&id)?;

    let page = state
        .communities
        .list_members(community_id, query.page(), query.page_size())
        .await?;

    Ok(Json(ApiResponse::success(PagedContent::from_page(
        page,
        MemberDetailDto::from,
    ))))
}

/// GET /v1/community/me/owner
/// Communities owned by the authenticated user.
pub async fn list_owned(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<PagedContent<CommunityDto>>>, ApiError> {
    let page = state
        .communities
        .list_owned(owner_id, query.page(), query.page_size())
        .await?;

    Ok(Json(ApiResponse::success(PagedContent::from_page(
        page,
        CommunityDto::from,
    ))))
}

/// GET /v1/community/me/member
/// Communities the authenticated user has joined.
pub async fn list_joined(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<PagedContent<CommunityWithOwnerDto>>>, ApiError> {
    let page = state
        .communities
        .list_joined(user_id, query.page(), query.page_size())
        .await?;

    Ok(Json(ApiResponse::success(PagedContent::from_page(
        page,
        CommunityWithOwnerDto::from,
    ))))
}
