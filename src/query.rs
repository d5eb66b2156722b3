//! Query execution: the request/response and throttle state machine.
//!
//! `execute` serializes command execution over the session, retries
//! transient I/O failures with an automatic re-login, and runs the
//! throttle-wait loop. Throttling is not an error from the caller's view:
//! it is a data-carrying response the executor waits out and retries,
//! indefinitely, with the wait recomputed fresh from each throttled
//! response — that is the documented server contract, not a place for
//! inferred exponential backoff.

use crate::active_query::SingleFlightGuard;
use crate::error::{Result, VndbLinkError};
use crate::event_handlers::EventHandlers;
use crate::models::{ApiStatus, Response, ResponseKind, Severity};
use crate::session::Session;
use crate::status::StatusCell;
use log::{debug, warn};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Send attempts per command before a transient failure is propagated.
pub(crate) const TRANSIENT_ATTEMPTS: u32 = 5;

/// Ceiling on a single throttle wait, applied per occurrence.
pub(crate) const MAX_THROTTLE_WAIT: Duration = Duration::from_secs(300);

/// Executes commands against the session, driving the status state machine:
///
/// ```text
/// Ready --send--> Busy --ok|results|dbstats--> Ready
///                 Busy --error(other)--------> Ready   (failed call, no retry)
///                 Busy --error(throttled)----> Throttled --wait--> Ready (re-send)
///                 any  --transport failure---> Error
///                 any  --close---------------> Closed
/// ```
#[derive(Clone)]
pub struct QueryExecutor {
    session: Arc<Mutex<Session>>,
    status: Arc<StatusCell>,
    guard: Arc<SingleFlightGuard>,
    handlers: EventHandlers,
}

impl QueryExecutor {
    pub(crate) fn new(
        session: Arc<Mutex<Session>>,
        status: Arc<StatusCell>,
        guard: Arc<SingleFlightGuard>,
        handlers: EventHandlers,
    ) -> Self {
        Self {
            session,
            status,
            guard,
            handlers,
        }
    }

    /// Execute one command and return its terminal (non-throttled) response.
    ///
    /// Requires status Ready; otherwise fails immediately, routing
    /// `error_message` through the text callback, without touching the
    /// network. On ordinary server errors the connection stays usable and
    /// status returns to Ready; on transport failures status becomes Error.
    pub async fn execute(&self, command: &str, error_message: &str) -> Result<Response> {
        let status = self.status.get();
        if status != ApiStatus::Ready {
            self.handlers.emit_text(error_message, Severity::Error);
            return Err(VndbLinkError::NotReady(status));
        }

        debug!("[VNDB_QUERY] executing: {}", preview(command));
        loop {
            self.status.set(ApiStatus::Busy);
            let response = match self.send_with_retry(command).await {
                Ok(response) => response,
                Err(err) => {
                    self.status.set(ApiStatus::Error);
                    self.handlers.emit_text(error_message, Severity::Error);
                    return Err(err);
                }
            };

            match response.kind {
                ResponseKind::Error if response.is_throttled() => {
                    if !self.throttle_wait(&response).await {
                        // Closed (or otherwise moved on) during the wait.
                        self.handlers.emit_text(error_message, Severity::Error);
                        return Err(VndbLinkError::NotReady(self.status.get()));
                    }
                    // Re-issue the byte-identical command.
                }
                ResponseKind::Error => {
                    self.status.set(ApiStatus::Ready);
                    self.handlers.emit_text(error_message, Severity::Error);
                    let detail = response.error.clone().unwrap_or_default();
                    let message = detail
                        .message()
                        .map(str::to_string)
                        .unwrap_or(response.payload);
                    return Err(VndbLinkError::ServerError {
                        id: detail.id,
                        message,
                    });
                }
                _ => {
                    self.status.set(ApiStatus::Ready);
                    debug!("[VNDB_QUERY] terminal response: {}", response.kind);
                    return Ok(response);
                }
            }
        }
    }

    /// Wait out one throttle occurrence: clamp the server's suggested wait,
    /// warn the caller, fire the refresh callback if the active operation
    /// asked for it, sleep, and return to Ready. The status callback fires
    /// before and after the wait.
    ///
    /// Returns `false` when the status left Throttled during the sleep
    /// (a `close()` fired mid-wait); the command must not be re-sent then.
    async fn throttle_wait(&self, response: &Response) -> bool {
        let fullwait = response
            .error
            .as_ref()
            .map(|detail| detail.fullwait)
            .unwrap_or(0.0);
        let wait = throttle_wait_duration(fullwait);

        self.status.set(ApiStatus::Throttled);
        self.handlers.emit_text(
            &format!("Throttled for {:.1} mins.", wait.as_secs_f64() / 60.0),
            Severity::Warning,
        );

        if let Some(active) = self.guard.current() {
            if !active.completed {
                if let Some(extra) = &active.extra_throttle_warning {
                    self.handlers.emit_text(extra, Severity::Warning);
                }
                if active.refresh_on_throttle {
                    self.handlers.emit_refresh_list();
                }
            }
        }

        debug!(
            "[VNDB_QUERY] throttled; waiting {:.1}s (server fullwait {fullwait}s)",
            wait.as_secs_f64()
        );
        tokio::time::sleep(wait).await;
        // A close() during the sleep sets Closed; don't clobber it.
        self.status
            .transition(ApiStatus::Throttled, ApiStatus::Ready)
    }

    /// Raw send wrapped in bounded transient-failure recovery: a peer-reset
    /// class failure triggers an automatic re-login (reopen + replay stored
    /// credentials) and a retry of the same command; anything else
    /// propagates.
    async fn send_with_retry(&self, command: &str) -> Result<Response> {
        let mut attempt = 1;
        loop {
            let result = {
                let mut session = self.session.lock().await;
                session.send_raw(command).await
            };
            match result {
                Ok(response) => return Ok(response),
                Err(err) if attempt < TRANSIENT_ATTEMPTS && is_reconnectable(&err) => {
                    warn!(
                        "[VNDB_QUERY] transient failure on attempt {attempt}/{TRANSIENT_ATTEMPTS}: {err}; re-logging in"
                    );
                    let mut session = self.session.lock().await;
                    session.relogin().await?;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Close the session; status Closed from any state.
    pub(crate) async fn close(&self) {
        let mut session = self.session.lock().await;
        session.close().await;
        drop(session);
        self.status.set(ApiStatus::Closed);
    }
}

/// Truncate long commands for log output.
fn preview(command: &str) -> String {
    match command.char_indices().nth(80) {
        Some((idx, _)) => format!("{}...", &command[..idx]),
        None => command.to_string(),
    }
}

/// Clamp a server-reported wait (seconds) to the per-occurrence ceiling.
fn throttle_wait_duration(fullwait: f64) -> Duration {
    let wait = Duration::from_secs_f64(fullwait.max(0.0));
    wait.min(MAX_THROTTLE_WAIT)
}

/// The peer-reset family recovered via re-login: ECONNRESET (WSAECONNRESET,
/// native 10054, maps to the same kind), aborted connections, and a server
/// EOF mid-session, which an abortive close surfaces as on some platforms.
fn is_reconnectable(err: &VndbLinkError) -> bool {
    match err {
        VndbLinkError::ConnectionClosed => true,
        VndbLinkError::Io(io_err) => {
            matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ) || io_err.raw_os_error() == Some(10054)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullwait_is_clamped_to_five_minutes() {
        assert_eq!(throttle_wait_duration(30.0), Duration::from_secs(30));
        assert_eq!(throttle_wait_duration(300.0), Duration::from_secs(300));
        assert_eq!(throttle_wait_duration(301.0), Duration::from_secs(300));
        assert_eq!(throttle_wait_duration(86400.0), Duration::from_secs(300));
        assert!(throttle_wait_duration(86400.0) <= Duration::from_millis(300_000));
    }

    #[test]
    fn test_fractional_and_negative_fullwait() {
        assert_eq!(throttle_wait_duration(0.5), Duration::from_millis(500));
        assert_eq!(throttle_wait_duration(-1.0), Duration::ZERO);
    }

    #[test]
    fn test_reconnectable_classification() {
        let reset = VndbLinkError::Io(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(is_reconnectable(&reset));
        assert!(is_reconnectable(&VndbLinkError::ConnectionClosed));

        let refused = VndbLinkError::Io(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(!is_reconnectable(&refused));
        assert!(!is_reconnectable(&VndbLinkError::NotConnected));
    }
}
