use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenService;
use crate::authz::Policy;
use crate::config::Config;
use crate::db::Store;
use crate::id::SnowflakeGenerator;
use crate::services::{AuthService, CommunityService, MemberService};

pub mod auth;
mod community;
mod error;
mod member;
mod observability;
mod role;
pub mod types;

pub use error::ApiError;
pub use types::ApiResponse;

use metrics_exporter_prometheus::PrometheusHandle;

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub ids: Arc<SnowflakeGenerator>,

    pub tokens: Arc<TokenService>,

    pub auth: AuthService,

    pub communities: CommunityService,

    pub members: MemberService,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let ids = Arc::new(SnowflakeGenerator::new(config.general.worker_id)?);
    let tokens = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_seconds,
    ));

    let auth = AuthService::new(
        store.clone(),
        ids.clone(),
        tokens.clone(),
        config.security.clone(),
    );
    let communities = CommunityService::new(store.clone(), ids.clone());
    let members = MemberService::new(store.clone(), ids.clone(), Policy::default());

    Ok(Arc::new(AppState {
        config,
        store,
        ids,
        tokens,
        auth,
        communities,
        members,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/v1/auth/signup", post(auth::signup))
        .route("/v1/auth/signin", post(auth::signin))
        .route("/v1/auth/me", get(auth::me))
        .route(
            "/v1/community",
            post(community::create).get(community::list),
        )
        .route("/v1/community/{id}/members", get(community::list_members))
        .route("/v1/community/me/owner", get(community::list_owned))
        .route("/v1/community/me/member", get(community::list_joined))
        .route("/v1/role", post(role::create).get(role::list))
        .route("/v1/member", post(member::add))
        .route("/v1/member/{id}", delete(member::remove))
        .route("/health/live", get(observability::health_live))
        .route("/health/ready", get(observability::health_ready))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
