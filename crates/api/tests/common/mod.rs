#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use slotswap_api::auth::jwt::JwtConfig;
use slotswap_api::config::ServerConfig;
use slotswap_api::router::build_app_router;
use slotswap_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router, with the production middleware stack,
/// on top of the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState::new(pool, test_config()))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A signed-up user and their access token.
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

/// Sign up `name` through the API (`{name}@test.com`, fixed password).
pub async fn signup(app: &Router, name: &str) -> TestUser {
    let body = json!({
        "name": name,
        "email": format!("{name}@test.com"),
        "password": "correct-horse-battery",
    });
    let response = post_json(app.clone(), "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), 201, "signup of {name} should succeed");
    let json = body_json(response).await;
    TestUser {
        id: json["data"]["user"]["id"].as_i64().unwrap(),
        token: json["data"]["token"].as_str().unwrap().to_string(),
    }
}

/// Create a one-hour slot (2030-01-01 09:00 UTC) for `user` and return its id.
pub async fn create_slot(app: &Router, user: &TestUser, title: &str, status: &str) -> i64 {
    let start = chrono::DateTime::parse_from_rfc3339("2030-01-01T09:00:00Z").unwrap();
    let end = start + chrono::Duration::hours(1);
    let body = json!({
        "title": title,
        "startTime": start.to_rfc3339(),
        "endTime": end.to_rfc3339(),
        "status": status,
    });
    let response = post_json_auth(app.clone(), "/api/v1/slots", body, &user.token).await;
    assert_eq!(response.status(), 201, "creating slot {title} should succeed");
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Fetch one of `user`'s slots from `GET /slots`.
pub async fn my_slot(app: &Router, user: &TestUser, slot_id: i64) -> Option<Value> {
    let response = get_auth(app.clone(), "/api/v1/slots", &user.token).await;
    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == slot_id)
        .cloned()
}

/// Propose a swap as `user`, returning the raw response.
pub async fn propose(app: &Router, user: &TestUser, my_slot: i64, their_slot: i64) -> Response<Body> {
    let body = json!({ "mySlotId": my_slot, "theirSlotId": their_slot });
    post_json_auth(app.clone(), "/api/v1/swap-request", body, &user.token).await
}

/// Answer swap request `request_id` as `user`, returning the raw response.
pub async fn respond(app: &Router, user: &TestUser, request_id: i64, accepted: bool) -> Response<Body> {
    let uri = format!("/api/v1/swap-response/{request_id}");
    post_json_auth(app.clone(), &uri, json!({ "accepted": accepted }), &user.token).await
}
