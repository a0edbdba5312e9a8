//! Dashboard request handlers.

use axum::Json;
use axum::extract::State;
use axum::Extension;

use cadenza_core::models::{GlobalDashboard, IdentityDashboard};

use crate::AppState;
use crate::envelope::{Envelope, fold};
use crate::middleware::auth::AuthenticatedUser;

/// `GET /api/dashboard/me`: dashboard for the authenticated identity.
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<Envelope<IdentityDashboard>> {
    let Ok(identity_id) = user.0.sub.parse::<i32>() else {
        return Json(Envelope::rejected("No fue posible identificar al usuario."));
    };
    Json(fold(state.identity.dashboard(identity_id).await))
}

/// `GET /api/dashboard/admin`: global dashboard. Admin role enforced by the
/// route layer.
pub async fn admin(State(state): State<AppState>) -> Json<Envelope<GlobalDashboard>> {
    Json(fold(state.identity.global_dashboard().await))
}
