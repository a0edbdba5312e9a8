//! Error taxonomy for identity operations.
//!
//! Datastore-level failures never surface here as raw `sqlx::Error`; the
//! procedure layer converts them to business rejections first. What remains
//! is the classification the orchestration layer cares about.

use thiserror::Error;

/// Failure classification for identity operations.
///
/// The `Display` rendering is the user-facing message; it never carries stack
/// traces or internal identifiers.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The requested identity or role does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Password mismatch or unknown account. The message is deliberately
    /// identical for both so callers cannot probe which emails exist.
    #[error("Las credenciales proporcionadas no son válidas.")]
    InvalidCredentials,

    /// A procedure reported failure or the datastore threw.
    #[error("{0}")]
    Persistence(String),

    /// A row was written but could not be read back. Operationally abnormal;
    /// logged at error severity where it is raised.
    #[error("{0}")]
    Inconsistent(String),

    /// Token signing failed.
    #[error("No fue posible emitir el token de acceso.")]
    Token(String),
}
