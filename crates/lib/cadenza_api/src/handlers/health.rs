//! Health probe.

use axum::Json;

use crate::envelope::Envelope;

/// `GET /health`.
pub async fn health() -> Json<Envelope<()>> {
    Json(Envelope {
        succeeded: true,
        message: "Healthy".into(),
        payload: None,
    })
}
