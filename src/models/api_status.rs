use serde::{Deserialize, Serialize};

/// Connection-level status of the API client.
///
/// `execute` is only permitted in `Ready`; every transition is reported
/// through the status callback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiStatus {
    /// Logged in, no request in flight.
    Ready,
    /// A request has been sent and the response is awaited.
    Busy,
    /// The server throttled the last request; the client is waiting it out.
    Throttled,
    /// An unrecoverable transport failure occurred.
    Error,
    /// The connection is closed (initial state, and after `close()`).
    Closed,
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiStatus::Ready => write!(f, "Ready"),
            ApiStatus::Busy => write!(f, "Busy"),
            ApiStatus::Throttled => write!(f, "Throttled"),
            ApiStatus::Error => write!(f, "Error"),
            ApiStatus::Closed => write!(f, "Closed"),
        }
    }
}
