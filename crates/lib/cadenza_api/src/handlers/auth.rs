//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use cadenza_core::identity::RegisterIdentity;
use cadenza_core::models::IssuedToken;

use crate::AppState;
use crate::envelope::{Envelope, fold};

/// `POST /api/auth/register` body. Field names follow the SPA wire contract.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub apellidos: Option<String>,
    pub correo: String,
    pub password: String,
}

/// `POST /api/auth/login` body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub correo: String,
    pub password: String,
}

/// `POST /api/auth/register`: create an account and mint a token.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Json<Envelope<IssuedToken>> {
    let result = state
        .identity
        .register(RegisterIdentity {
            display_name: body.nombre,
            family_name: body.apellidos,
            email: body.correo,
            password: body.password,
        })
        .await;
    Json(fold(result))
}

/// `POST /api/auth/login`: authenticate with email and password.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Json<Envelope<IssuedToken>> {
    Json(fold(state.identity.login(&body.correo, &body.password).await))
}
