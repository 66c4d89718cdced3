//! HTTP-level integration tests for signup, login and the current user.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, signup};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_returns_token_and_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = json!({
        "name": "Alice",
        "email": "Alice@Test.com",
        "password": "correct-horse-battery",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["data"]["token"].is_string());
    assert!(json["data"]["expiresIn"].is_number());
    assert_eq!(json["data"]["user"]["name"], "Alice");
    assert_eq!(json["data"]["user"]["email"], "alice@test.com");
    assert!(json["data"]["user"].get("passwordHash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_rejects_invalid_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    let short_password = json!({ "name": "Bob", "email": "bob@test.com", "password": "short" });
    let response = post_json(app.clone(), "/api/v1/auth/signup", short_password).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let bad_email = json!({ "name": "Bob", "email": "not-an-email", "password": "long-enough-pw" });
    let response = post_json(app, "/api/v1/auth/signup", bad_email).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_a_conflict(pool: PgPool) {
    let app = common::build_test_app(pool);
    signup(&app, "carol").await;

    let body = json!({
        "name": "Another Carol",
        "email": "carol@test.com",
        "password": "correct-horse-battery",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_correct_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = signup(&app, "dave").await;

    let body = json!({ "email": "DAVE@test.com", "password": "correct-horse-battery" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert!(json["data"]["token"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_failures_are_indistinguishable(pool: PgPool) {
    let app = common::build_test_app(pool);
    signup(&app, "erin").await;

    let wrong_password = json!({ "email": "erin@test.com", "password": "wrong-password" });
    let response = post_json(app.clone(), "/api/v1/auth/login", wrong_password).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let first = body_json(response).await;

    let unknown = json!({ "email": "nobody@test.com", "password": "wrong-password" });
    let response = post_json(app, "/api/v1/auth/login", unknown).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let second = body_json(response).await;

    assert_eq!(first, second);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_returns_current_user(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = signup(&app, "frank").await;

    let response = get_auth(app, "/api/v1/auth/me", &user.token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["email"], "frank@test.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_routes_require_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    for uri in ["/api/v1/auth/me", "/api/v1/slots", "/api/v1/swappable-slots", "/api/v1/swap-requests/me"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = get_auth(app, "/api/v1/slots", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}
