//! Bearer-token middleware.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use cadenza_core::auth::jwt::ADMIN_CLAIM;
use cadenza_core::models::TokenClaims;

use crate::AppState;
use crate::envelope::Envelope;

/// Verified claims injected into request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

/// Extracts `Authorization: Bearer <token>`, verifies the JWT (signature,
/// issuer, audience, expiry), and injects [`AuthenticatedUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(token) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
        return reject(StatusCode::UNAUTHORIZED, "Se requiere un token de acceso.");
    };

    let Some(claims) = state.tokens.verify(token) else {
        return reject(
            StatusCode::UNAUTHORIZED,
            "El token no es válido o ha expirado.",
        );
    };

    request.extensions_mut().insert(AuthenticatedUser(claims));
    next.run(request).await
}

/// Rejects any request whose role claim is not `Admin`. Layered inside
/// [`require_auth`], so the claims are already verified.
pub async fn require_admin(request: Request, next: Next) -> Response {
    let is_admin = request
        .extensions()
        .get::<AuthenticatedUser>()
        .is_some_and(|user| user.0.role == ADMIN_CLAIM);

    if !is_admin {
        return reject(
            StatusCode::FORBIDDEN,
            "Se requiere el rol de administrador.",
        );
    }
    next.run(request).await
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(Envelope::<()>::rejected(message))).into_response()
}
