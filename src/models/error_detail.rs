use serde::{Deserialize, Serialize};

/// Error id the server uses to signal rate limiting.
pub const THROTTLED_ID: &str = "throttled";

/// Decoded payload of an `error` response.
///
/// The wire format is JSON: `{"id": "<string>", "fullwait": <seconds>, ...}`.
/// Only `id == "throttled"` receives special handling; everything else is
/// carried opaquely in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    /// Machine-readable error identifier (e.g. `parse`, `throttled`).
    pub id: String,

    /// Suggested wait in seconds before the command may be retried.
    /// Only meaningful for throttle errors; the server may send a
    /// fractional value.
    #[serde(default)]
    pub fullwait: f64,

    /// Remaining fields of the error record, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ErrorDetail {
    /// Whether this error is the server's throttle signal.
    pub fn is_throttled(&self) -> bool {
        self.id == THROTTLED_ID
    }

    /// Human-readable message from the record, if the server sent one.
    pub fn message(&self) -> Option<&str> {
        self.extra.get("msg").and_then(|v| v.as_str())
    }
}

impl Default for ErrorDetail {
    fn default() -> Self {
        Self {
            id: "unknown".to_string(),
            fullwait: 0.0,
            extra: serde_json::Map::new(),
        }
    }
}
