use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::api::types::{
    ApiResponse, DEFAULT_PAGE_SIZE, DataContent, PageQuery, PagedContent, RoleDto,
};
use crate::services::now_rfc3339;

#[derive(Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
}

/// POST /v1/role
/// Add a role to the catalog. Names are globally unique.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<Json<ApiResponse<DataContent<RoleDto>>>, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Name is required"));
    }

    if state.store.get_role_by_name(name).await?.is_some() {
        return Err(ApiError::validation("Role with this name already exists"));
    }

    let id = state.ids.generate();
    let now = now_rfc3339();
    let role = state.store.create_role(id, name, &now).await?;

    Ok(Json(ApiResponse::success(DataContent {
        data: RoleDto::from(role),
    })))
}

/// GET /v1/role?page=
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<PagedContent<RoleDto>>>, ApiError> {
    let page = state
        .store
        .list_roles(query.page(), DEFAULT_PAGE_SIZE)
        .await?;

    Ok(Json(ApiResponse::success(PagedContent::from_page(
        page,
        RoleDto::from,
    ))))
}
