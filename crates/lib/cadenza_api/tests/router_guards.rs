//! Router tests: build the router over a lazy (never connected) pool and
//! exercise the health endpoint and the auth guards with `oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use cadenza_api::config::ApiConfig;
use cadenza_api::AppState;
use cadenza_core::auth::jwt::TokenIssuer;
use cadenza_core::config::JwtConfig;
use cadenza_core::models::Credential;

fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        key: "router-test-key".into(),
        issuer: "cadenza-test".into(),
        audience: "cadenza-test-spa".into(),
        expiry_minutes: 5,
    }
}

/// State over a pool that never connects: nothing here needs a live
/// datastore, and handlers that do reach it must still answer with the
/// business envelope rather than an HTTP error.
fn test_state() -> AppState {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy("postgres://127.0.0.1:1/cadenza")
        .expect("lazy pool");
    AppState::new(
        pool,
        &ApiConfig {
            jwt: test_jwt_config(),
            cors_origins: vec!["http://localhost:5173".into()],
        },
    )
}

fn test_router() -> axum::Router {
    let config = ApiConfig {
        jwt: test_jwt_config(),
        cors_origins: vec!["http://localhost:5173".into()],
    };
    cadenza_api::router(test_state(), &config)
}

fn bearer_token(role_name: &str, is_admin: bool) -> String {
    let issuer = TokenIssuer::new(test_jwt_config());
    let credential = Credential {
        identity_id: 1,
        display_name: "Ana".into(),
        family_name: None,
        email: "ana@example.com".into(),
        role_name: role_name.into(),
        is_admin,
    };
    issuer.issue(&credential).expect("issue token").token
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("parse JSON")
}

#[tokio::test]
async fn health_returns_envelope() {
    let app = test_router();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .expect("request");

    assert_eq!(StatusCode::OK, response.status());
    let json = body_json(response).await;
    assert_eq!(true, json["succeeded"]);
    assert_eq!("Healthy", json["message"]);
    assert!(json["payload"].is_null());
}

#[tokio::test]
async fn dashboard_without_token_is_unauthorized() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request");

    assert_eq!(StatusCode::UNAUTHORIZED, response.status());
    let json = body_json(response).await;
    assert_eq!(false, json["succeeded"]);
}

#[tokio::test]
async fn dashboard_with_garbage_token_is_unauthorized() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/me")
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request");

    assert_eq!(StatusCode::UNAUTHORIZED, response.status());
}

#[tokio::test]
async fn admin_dashboard_rejects_non_admin_tokens() {
    let app = test_router();
    let token = bearer_token("Artista", false);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/admin")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request");

    assert_eq!(StatusCode::FORBIDDEN, response.status());
    let json = body_json(response).await;
    assert_eq!(false, json["succeeded"]);
}

#[tokio::test]
async fn datastore_failure_surfaces_as_business_envelope() {
    // A valid token reaches the handler; the unreachable pool must fold into
    // a 200 envelope with succeeded=false, never an HTTP 5xx.
    let app = test_router();
    let token = bearer_token("Artista", false);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request");

    assert_eq!(StatusCode::OK, response.status());
    let json = body_json(response).await;
    assert_eq!(false, json["succeeded"]);
    assert!(json["payload"].is_null());
}
