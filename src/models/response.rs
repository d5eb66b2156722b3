use crate::models::{ErrorDetail, ResponseKind};

/// An immutable, classified server response.
///
/// Produced by the framer for exactly one request and never mutated after
/// creation. `error` is populated iff `kind == ResponseKind::Error`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Classification by leading keyword.
    pub kind: ResponseKind,
    /// Raw payload text after the keyword (empty if the message had none).
    pub payload: String,
    /// Decoded error record for `error` responses.
    pub error: Option<ErrorDetail>,
}

impl Response {
    /// Whether this response is the server's throttle signal.
    pub fn is_throttled(&self) -> bool {
        self.error.as_ref().is_some_and(ErrorDetail::is_throttled)
    }
}
