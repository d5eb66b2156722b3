//! Error types for the vndb-link client library.

use crate::models::ApiStatus;
use thiserror::Error;

/// Errors produced by the vndb-link client.
///
/// Network-origin failures are additionally funneled through the client's
/// status field and the text callback (see [`EventHandlers`]), so UI-layer
/// callers can drive everything off callbacks and treat the returned error
/// as informational.
///
/// [`EventHandlers`]: crate::event_handlers::EventHandlers
#[derive(Debug, Error)]
pub enum VndbLinkError {
    /// Invalid client configuration (builder misuse, bad hostname).
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// Socket-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake failure other than a name mismatch.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The server certificate does not match the expected hostname.
    /// Fatal for the connection attempt; never retried.
    #[error("server certificate is not valid for host '{host}'")]
    CertificateMismatch { host: String },

    /// The server closed the connection (zero-byte read) while a response
    /// was expected.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// An operation that needs a transport was invoked before `open()`.
    #[error("not connected")]
    NotConnected,

    /// `execute` was called while the client was not in the Ready state.
    #[error("client is not ready (status: {0})")]
    NotReady(ApiStatus),

    /// The server rejected the login command.
    #[error("authentication failed: {0}")]
    AuthenticationError(String),

    /// The server answered with a non-throttle `error` response.
    /// The connection stays usable; the command is not retried.
    #[error("server error '{id}': {message}")]
    ServerError { id: String, message: String },

    /// A response that could not be decoded (invalid UTF-8).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VndbLinkError>;
