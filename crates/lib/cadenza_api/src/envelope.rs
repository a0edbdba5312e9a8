//! Uniform response envelope.
//!
//! Every operation answers with `{succeeded, message, payload}`; a business
//! failure is an ordinary 200 response with `succeeded: false`, never an
//! HTTP error or a raised exception.

use serde::Serialize;

use cadenza_core::error::IdentityError;
use cadenza_core::identity::Granted;

/// The wrapper every core operation returns over the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub succeeded: bool,
    pub message: String,
    pub payload: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
            payload: Some(payload),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
            payload: None,
        }
    }
}

/// Folds a service result into the envelope. The error's `Display` rendering
/// is the user-facing message; the taxonomy guarantees it carries no
/// internals.
pub fn fold<T>(result: Result<Granted<T>, IdentityError>) -> Envelope<T> {
    match result {
        Ok(granted) => Envelope::ok(granted.message, granted.payload),
        Err(e) => Envelope::rejected(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_with_null_payload_on_failure() {
        let envelope = Envelope::<i32>::rejected("no");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            serde_json::json!({"succeeded": false, "message": "no", "payload": null}),
            json
        );
    }

    #[test]
    fn fold_maps_both_arms() {
        let ok = fold(Ok(Granted {
            message: "listo".into(),
            payload: 7,
        }));
        assert!(ok.succeeded);
        assert_eq!(Some(7), ok.payload);

        let err = fold::<i32>(Err(IdentityError::InvalidCredentials));
        assert!(!err.succeeded);
        assert_eq!("Las credenciales proporcionadas no son válidas.", err.message);
    }
}
