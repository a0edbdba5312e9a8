//! # cadenza_api
//!
//! HTTP API library for Cadenza. A thin boundary: routes, bearer-token
//! middleware, and the uniform response envelope around `cadenza_core`.

pub mod config;
pub mod envelope;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use cadenza_core::auth::jwt::TokenIssuer;
use cadenza_core::identity::IdentityService;
use cadenza_core::procedure::ProcedureExecutor;

use crate::config::ApiConfig;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity orchestration service.
    pub identity: Arc<IdentityService>,
    /// Token issuer, shared with the middleware for verification.
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(pool: PgPool, config: &ApiConfig) -> Self {
        let tokens = TokenIssuer::new(config.jwt.clone());
        let executor = ProcedureExecutor::new(pool);
        Self {
            identity: Arc::new(IdentityService::new(executor, tokens.clone())),
            tokens,
        }
    }
}

/// Parses configured CORS origins into header values. An origin that fails
/// to parse is dropped, with a warning naming it; a silent drop would leave
/// a typo in `CORS_ALLOWED_ORIGINS` locking every origin out undiagnosed.
fn parse_cors_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect()
}

/// Builds the axum router with all routes and shared state.
pub fn router(state: AppState, config: &ApiConfig) -> Router {
    let origins = parse_cors_origins(&config.cors_origins);
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login));

    // The admin dashboard additionally requires the Admin role claim.
    let admin = Router::new()
        .route("/api/dashboard/admin", get(handlers::dashboard::admin))
        .layer(axum::middleware::from_fn(middleware::auth::require_admin));

    // Protected routes (require a verified bearer token)
    let protected = Router::new()
        .route("/api/dashboard/me", get(handlers::dashboard::me))
        .merge(admin)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cors_origins_keeps_valid_and_drops_invalid() {
        let configured = vec![
            "http://localhost:5173".to_string(),
            "not a header\u{0} value".to_string(),
            "https://app.example.com".to_string(),
        ];
        let parsed = parse_cors_origins(&configured);
        assert_eq!(2, parsed.len());
        assert_eq!("http://localhost:5173", parsed[0]);
        assert_eq!("https://app.example.com", parsed[1]);
    }

    #[test]
    fn parse_cors_origins_empty_input() {
        assert!(parse_cors_origins(&[]).is_empty());
    }
}
