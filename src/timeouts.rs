//! Timeout configuration for client operations.
//!
//! Centralizes the tunable durations: connection establishment, socket
//! send/receive, and the delay between connection-open retries. Retry
//! counts and the throttle-wait ceiling are protocol policy, not
//! configuration, and live as constants next to the code that applies them.

use std::time::Duration;

/// Timeout configuration for vndb-link client operations.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use vndb_link::Timeouts;
///
/// // Use defaults (recommended for most cases)
/// let timeouts = Timeouts::default();
///
/// // Custom timeouts for high-latency environments
/// let timeouts = Timeouts::builder()
///     .connection_timeout(Duration::from_secs(30))
///     .receive_timeout(Duration::from_secs(120))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Timeout for establishing a connection (TCP connect + TLS handshake).
    /// Default: 10 seconds.
    pub connection_timeout: Duration,

    /// Timeout for receiving a full response after a command is sent.
    /// Zero disables the timeout. Default: 30 seconds.
    pub receive_timeout: Duration,

    /// Timeout for writing a command to the socket.
    /// Zero disables the timeout. Default: 10 seconds.
    pub send_timeout: Duration,

    /// Delay between connection-open attempts. Default: 1 second.
    pub open_retry_delay: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(10),
            open_retry_delay: Duration::from_secs(1),
        }
    }
}

impl Timeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> TimeoutsBuilder {
        TimeoutsBuilder::new()
    }

    /// Timeouts optimized for fast local development.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            receive_timeout: Duration::from_secs(5),
            send_timeout: Duration::from_secs(2),
            open_retry_delay: Duration::from_millis(200),
        }
    }

    /// Timeouts suitable for integration tests against a local server.
    ///
    /// Uses a millisecond retry delay so the plaintext-fallback path (5
    /// failed TLS attempts before the fallback pass) completes quickly.
    pub fn for_testing() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            receive_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(2),
            open_retry_delay: Duration::from_millis(10),
        }
    }

    /// Check if a duration represents "no timeout".
    pub fn is_no_timeout(duration: Duration) -> bool {
        duration.is_zero()
    }
}

/// Builder for creating custom [`Timeouts`] configurations.
#[derive(Debug, Clone)]
pub struct TimeoutsBuilder {
    timeouts: Timeouts,
}

impl TimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: Timeouts::default(),
        }
    }

    /// Set the connection timeout (TCP connect + TLS handshake).
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the receive timeout (waiting for a full response).
    /// Zero disables the timeout.
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.receive_timeout = timeout;
        self
    }

    /// Set the send timeout (writing a command to the socket).
    /// Zero disables the timeout.
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.send_timeout = timeout;
        self
    }

    /// Set the delay between connection-open attempts.
    pub fn open_retry_delay(mut self, delay: Duration) -> Self {
        self.timeouts.open_retry_delay = delay;
        self
    }

    /// Build the timeout configuration.
    pub fn build(self) -> Timeouts {
        self.timeouts
    }
}
