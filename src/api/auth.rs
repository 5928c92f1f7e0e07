use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, request::Parts},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::api::types::{AccessTokenMeta, ApiResponse, AuthContent, DataContent, UserDto};
use crate::auth::TokenError;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
/// Carries the verified user ID; the user's continued existence is checked
/// by handlers that need the full record.
pub struct AuthUser(pub i64);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(TokenError::Missing)?;
        let claims = state.tokens.verify(&token)?;
        let user_id = claims.user_id()?;

        tracing::Span::current().record("user_id", user_id);

        Ok(Self(user_id))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let auth_header = parts.headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// POST /v1/auth/signup
/// Register a new user; returns the user and a fresh bearer token.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthContent>>), ApiError> {
    let authenticated = state
        .auth
        .signup(payload.name, &payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AuthContent {
            data: UserDto::from(authenticated.user),
            meta: AccessTokenMeta {
                access_token: authenticated.access_token,
            },
        })),
    ))
}

/// POST /v1/auth/signin
/// Authenticate with email and password.
pub async fn signin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<ApiResponse<AuthContent>>, ApiError> {
    let authenticated = state
        .auth
        .signin(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(AuthContent {
        data: UserDto::from(authenticated.user),
        meta: AccessTokenMeta {
            access_token: authenticated.access_token,
        },
    })))
}

/// GET /v1/auth/me
/// Get the authenticated user. Never includes the password hash.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<DataContent<UserDto>>>, ApiError> {
    let user = state.auth.current_user(user_id).await?;

    Ok(Json(ApiResponse::success(DataContent {
        data: UserDto::from(user),
    })))
}
