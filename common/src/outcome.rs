use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an operation did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Application, customer, agent, bank record or QR code missing.
    NotFound,
    /// The application is not in a status the requested transition starts from.
    InvalidTransition,
    /// A record the transition depends on (e.g. the customer account) is missing.
    PreconditionFailed,
    /// The request itself is malformed.
    InvalidInput,
    PersistenceError,
    /// Mail delivery failed. Only surfaced by explicit redelivery, never by a transition.
    NotificationError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Envelope every backend route answers with.
///
/// Serialized as `{ "ok": true, "data": ... }` or
/// `{ "ok": false, "kind": "InvalidTransition", "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Outcome {
            ok: true,
            data: Some(data),
            kind: None,
            message: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Outcome {
            ok: false,
            data: None,
            kind: Some(kind),
            message: Some(message.into()),
        }
    }

    /// Converts back into a `Result`, for API consumers and tests.
    pub fn into_result(self) -> Result<T, (ErrorKind, String)> {
        match (self.ok, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err((
                self.kind.unwrap_or(ErrorKind::PersistenceError),
                self.message.unwrap_or_default(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_kind_and_message_only() {
        let value =
            serde_json::to_value(Outcome::<()>::failure(ErrorKind::InvalidTransition, "nope"))
                .unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "ok": false, "kind": "InvalidTransition", "message": "nope" })
        );
    }

    #[test]
    fn success_round_trips_into_result() {
        let json = serde_json::to_string(&Outcome::success(vec![1, 2])).unwrap();
        let back: Outcome<Vec<i32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_result(), Ok(vec![1, 2]));
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Receipt {
        id: String,
    }

    #[test]
    fn payloads_without_default_deserialize_either_way() {
        let ok: Outcome<Receipt> =
            serde_json::from_str(r#"{ "ok": true, "data": { "id": "r-1" } }"#).unwrap();
        assert_eq!(ok.into_result(), Ok(Receipt { id: "r-1".to_string() }));

        let failed: Outcome<Receipt> = serde_json::from_str(
            r#"{ "ok": false, "kind": "NotFound", "message": "receipt r-2 not found" }"#,
        )
        .unwrap();
        assert_eq!(
            failed.into_result(),
            Err((ErrorKind::NotFound, "receipt r-2 not found".to_string()))
        );
    }
}
