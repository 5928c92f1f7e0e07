use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use communa::api;
use communa::auth::TokenService;
use communa::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-secret";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps the in-memory database shared.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.observability.metrics_enabled = false;
    // Keep password hashing cheap in tests.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app() -> Router {
    let state = api::create_app_state(test_config(), None)
        .await
        .expect("Failed to create app state");
    api::router(state)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = if let Some(body) = body {
        builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

async fn signup(app: &Router, name: &str, email: &str, password: &str) -> (String, String) {
    let (status, body) = request(
        app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({"name": name, "email": email, "password": password})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    let user_id = body["content"]["data"]["id"].as_str().unwrap().to_string();
    let token = body["content"]["meta"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();
    (user_id, token)
}

/// Seeds the fixed role catalog, returning (admin, moderator, member) role ids.
async fn seed_roles(app: &Router) -> (String, String, String) {
    let mut ids = Vec::new();
    for name in ["Community Admin", "Community Moderator", "Community Member"] {
        let (status, body) =
            request(app, "POST", "/v1/role", None, Some(json!({"name": name}))).await;
        assert_eq!(status, StatusCode::OK, "role seed failed: {body}");
        ids.push(body["content"]["data"]["id"].as_str().unwrap().to_string());
    }
    (ids.remove(0), ids.remove(0), ids.remove(0))
}

async fn create_community(app: &Router, token: &str, name: &str) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/v1/community",
        Some(token),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "community create failed: {body}");
    body["content"]["data"].clone()
}

#[tokio::test]
async fn signup_then_signin_then_me() {
    let app = spawn_app().await;

    let (user_id, _) = signup(&app, "Ada", "a@x.com", "p1").await;

    let (status, body) = request(
        &app,
        "POST",
        "/v1/auth/signin",
        None,
        Some(json!({"email": "a@x.com", "password": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(body["content"]["data"]["id"], user_id);
    let token = body["content"]["meta"]["access_token"].as_str().unwrap();

    let (status, body) = request(&app, "GET", "/v1/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["data"]["id"], user_id);
    assert_eq!(body["content"]["data"]["email"], "a@x.com");
    // Password material must never leak.
    assert!(body["content"]["data"].get("password").is_none());
    assert!(body["content"]["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn signin_error_cases() {
    let app = spawn_app().await;
    signup(&app, "Ada", "a@x.com", "p1").await;

    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/signin",
        None,
        Some(json!({"email": "nobody@x.com", "password": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "POST",
        "/v1/auth/signin",
        None,
        Some(json!({"email": "a@x.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = spawn_app().await;
    signup(&app, "Ada", "a@x.com", "p1").await;

    let (status, body) = request(
        &app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({"email": "a@x.com", "password": "p2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], false);
    assert!(body["error"].as_str().unwrap().contains("already registered"));
}

#[tokio::test]
async fn bearer_token_is_required_and_checked() {
    let app = spawn_app().await;

    let (status, _) = request(&app, "GET", "/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/v1/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Token signed with the right secret but already expired.
    let stale = TokenService::new(TEST_SECRET, -3600);
    let expired = stale.issue(123).unwrap();
    let (status, body) = request(&app, "GET", "/v1/auth/me", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn community_creation_requires_seeded_admin_role() {
    let app = spawn_app().await;
    let (_, token) = signup(&app, "Ada", "a@x.com", "p1").await;

    let (status, _) = request(
        &app,
        "POST",
        "/v1/community",
        Some(&token),
        Some(json!({"name": "Orphans"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // The failed creation must not leave an orphaned community behind.
    let (status, body) = request(&app, "GET", "/v1/community?page=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["meta"]["total"], 0);
}

#[tokio::test]
async fn duplicate_names_get_suffixed_slugs() {
    let app = spawn_app().await;
    seed_roles(&app).await;
    let (_, token) = signup(&app, "Ada", "a@x.com", "p1").await;

    let first = create_community(&app, &token, "Test").await;
    assert_eq!(first["slug"], "test");

    let second = create_community(&app, &token, "Test").await;
    assert_eq!(second["slug"], "test-1");

    let third = create_community(&app, &token, "Test").await;
    assert_eq!(third["slug"], "test-2");
}

#[tokio::test]
async fn owner_gets_admin_membership_on_creation() {
    let app = spawn_app().await;
    seed_roles(&app).await;
    let (user_id, token) = signup(&app, "Ada", "a@x.com", "p1").await;

    let community = create_community(&app, &token, "My Corner").await;
    assert_eq!(community["slug"], "my-corner");
    let community_id = community["id"].as_str().unwrap();

    let (status, body) = request(
        &app,
        "GET",
        &format!("/v1/community/{community_id}/members"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["meta"]["total"], 1);
    let member = &body["content"]["data"][0];
    assert_eq!(member["user"]["id"], user_id);
    assert_eq!(member["role"]["name"], "Community Admin");
}

#[tokio::test]
async fn owned_and_joined_listings() {
    let app = spawn_app().await;
    let (_, _, member_role) = seed_roles(&app).await;
    let (_, owner_token) = signup(&app, "Ada", "a@x.com", "p1").await;
    let (bob_id, bob_token) = signup(&app, "Bob", "b@x.com", "p2").await;

    let community = create_community(&app, &owner_token, "Shared Space").await;
    let community_id = community["id"].as_str().unwrap();

    let (status, body) = request(
        &app,
        "POST",
        "/v1/member",
        Some(&owner_token),
        Some(json!({"community": community_id, "user": bob_id, "role": member_role})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "member add failed: {body}");

    let (status, body) =
        request(&app, "GET", "/v1/community/me/owner", Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["meta"]["total"], 1);
    assert_eq!(body["content"]["data"][0]["slug"], "shared-space");

    let (status, body) =
        request(&app, "GET", "/v1/community/me/member", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["meta"]["total"], 1);
    assert_eq!(body["content"]["data"][0]["slug"], "shared-space");
    assert_eq!(body["content"]["data"][0]["owner"]["name"], "Ada");

    let (status, body) =
        request(&app, "GET", "/v1/community/me/owner", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["meta"]["total"], 0);
}

#[tokio::test]
async fn member_add_validates_references() {
    let app = spawn_app().await;
    let (_, _, member_role) = seed_roles(&app).await;
    let (user_id, token) = signup(&app, "Ada", "a@x.com", "p1").await;
    let community = create_community(&app, &token, "Real Place").await;
    let community_id = community["id"].as_str().unwrap();

    // Dangling community
    let (status, _) = request(
        &app,
        "POST",
        "/v1/member",
        Some(&token),
        Some(json!({"community": "999999", "user": user_id, "role": member_role})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Dangling user
    let (status, _) = request(
        &app,
        "POST",
        "/v1/member",
        Some(&token),
        Some(json!({"community": community_id, "user": "999999", "role": member_role})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Dangling role
    let (status, _) = request(
        &app,
        "POST",
        "/v1/member",
        Some(&token),
        Some(json!({"community": community_id, "user": user_id, "role": "999999"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Owner already holds a membership from community creation.
    let (status, _) = request(
        &app,
        "POST",
        "/v1/member",
        Some(&token),
        Some(json!({"community": community_id, "user": user_id, "role": member_role})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn member_removal_is_role_gated() {
    let app = spawn_app().await;
    let (_, moderator_role, member_role) = seed_roles(&app).await;
    let (_, admin_token) = signup(&app, "Ada", "a@x.com", "p1").await;
    let (bob_id, bob_token) = signup(&app, "Bob", "b@x.com", "p2").await;
    let (carol_id, carol_token) = signup(&app, "Carol", "c@x.com", "p3").await;

    let community = create_community(&app, &admin_token, "Gated").await;
    let community_id = community["id"].as_str().unwrap();

    // Bob joins as a plain member, Carol as a moderator.
    let (_, body) = request(
        &app,
        "POST",
        "/v1/member",
        Some(&admin_token),
        Some(json!({"community": community_id, "user": bob_id, "role": member_role})),
    )
    .await;
    let bob_membership = body["content"]["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = request(
        &app,
        "POST",
        "/v1/member",
        Some(&admin_token),
        Some(json!({"community": community_id, "user": carol_id, "role": moderator_role})),
    )
    .await;
    let carol_membership = body["content"]["data"]["id"].as_str().unwrap().to_string();

    // A plain member may not remove anyone.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/v1/member/{carol_membership}"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The denied attempt left the target untouched.
    let (_, body) = request(
        &app,
        "GET",
        &format!("/v1/community/{community_id}/members"),
        None,
        None,
    )
    .await;
    assert_eq!(body["content"]["meta"]["total"], 3);

    // A moderator may remove.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/v1/member/{bob_membership}"),
        Some(&carol_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Removing an already-removed membership is a 404.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/v1/member/{bob_membership}"),
        Some(&carol_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // An outsider with no membership in the community is forbidden.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/v1/member/{carol_membership}"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_catalog_crud() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/v1/role",
        None,
        Some(json!({"name": "Community Admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["data"]["name"], "Community Admin");

    let (status, body) = request(
        &app,
        "POST",
        "/v1/role",
        None,
        Some(json!({"name": "Community Admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let (status, body) = request(&app, "GET", "/v1/role?page=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["meta"]["total"], 1);
    assert_eq!(body["content"]["data"][0]["name"], "Community Admin");
}

#[tokio::test]
async fn health_probes_respond() {
    let app = spawn_app().await;

    let (status, body) = request(&app, "GET", "/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["data"]["status"], "alive");

    let (status, body) = request(&app, "GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["data"]["database"], true);
}

#[tokio::test]
async fn pagination_past_the_end_is_empty_with_correct_meta() {
    let app = spawn_app().await;
    seed_roles(&app).await;

    let (status, body) = request(&app, "GET", "/v1/role?page=5", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["meta"]["total"], 3);
    assert_eq!(body["content"]["meta"]["pages"], 1);
    assert_eq!(body["content"]["meta"]["page"], 5);
    assert_eq!(body["content"]["data"].as_array().unwrap().len(), 0);
}
