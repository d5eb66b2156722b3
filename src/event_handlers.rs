//! Callback hooks the client exposes to its embedding application.
//!
//! The core stays decoupled from any UI framework: observers register plain
//! closures and the client dispatches into them at well-defined points:
//!
//! - [`on_text`](EventHandlers::on_text): user-facing messages with a severity
//! - [`on_status`](EventHandlers::on_status): every API status transition
//! - [`on_send`](EventHandlers::on_send) / [`on_receive`](EventHandlers::on_receive):
//!   raw wire traffic (debug/tracing hooks)
//! - [`on_refresh_list`](EventHandlers::on_refresh_list): fired when a
//!   throttled operation was started with refresh-on-throttle behavior
//!
//! # Example
//!
//! ```rust
//! use vndb_link::EventHandlers;
//!
//! let handlers = EventHandlers::new()
//!     .on_text(|message, severity| println!("[{severity}] {message}"))
//!     .on_status(|status| println!("status: {status}"));
//! ```

use crate::models::{ApiStatus, Severity};
use std::fmt;
use std::sync::Arc;

/// Type alias for the user-facing text callback.
pub type OnTextCallback = Arc<dyn Fn(&str, Severity) + Send + Sync>;

/// Type alias for the status-changed callback.
pub type OnStatusCallback = Arc<dyn Fn(ApiStatus) + Send + Sync>;

/// Type alias for the raw outbound/inbound wire hooks.
pub type OnWireCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Type alias for the refresh-list callback.
pub type OnRefreshListCallback = Arc<dyn Fn() + Send + Sync>;

/// Observer callbacks for the client.
///
/// All handlers are optional. Handlers are `Send + Sync` so they work with
/// the async tokio runtime; they are invoked inline at await-completion
/// points and should return quickly.
#[derive(Clone, Default)]
pub struct EventHandlers {
    /// User-facing messages (progress, throttle warnings, failures).
    pub(crate) on_text: Option<OnTextCallback>,

    /// Every API status transition.
    pub(crate) on_status: Option<OnStatusCallback>,

    /// Every raw command sent to the server (debug/tracing).
    pub(crate) on_send: Option<OnWireCallback>,

    /// Every raw response received from the server (debug/tracing).
    pub(crate) on_receive: Option<OnWireCallback>,

    /// Fired once per throttle occurrence, before the wait, when the active
    /// operation requested refresh-on-throttle behavior.
    pub(crate) on_refresh_list: Option<OnRefreshListCallback>,
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_text", &self.on_text.is_some())
            .field("on_status", &self.on_status.is_some())
            .field("on_send", &self.on_send.is_some())
            .field("on_receive", &self.on_receive.is_some())
            .field("on_refresh_list", &self.on_refresh_list.is_some())
            .finish()
    }
}

impl EventHandlers {
    /// Create a new empty `EventHandlers` (no callbacks registered).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for user-facing messages.
    pub fn on_text(mut self, f: impl Fn(&str, Severity) + Send + Sync + 'static) -> Self {
        self.on_text = Some(Arc::new(f));
        self
    }

    /// Register a callback invoked on every API status transition.
    pub fn on_status(mut self, f: impl Fn(ApiStatus) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Arc::new(f));
        self
    }

    /// Register a debug hook receiving every raw command sent.
    pub fn on_send(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_send = Some(Arc::new(f));
        self
    }

    /// Register a debug hook receiving every raw response received.
    pub fn on_receive(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_receive = Some(Arc::new(f));
        self
    }

    /// Register the refresh-list callback for throttled refresh operations.
    pub fn on_refresh_list(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_refresh_list = Some(Arc::new(f));
        self
    }

    /// Returns `true` if any handler is registered.
    pub fn has_any(&self) -> bool {
        self.on_text.is_some()
            || self.on_status.is_some()
            || self.on_send.is_some()
            || self.on_receive.is_some()
            || self.on_refresh_list.is_some()
    }

    // ---------------------------------------------------------------
    // Internal dispatch helpers
    // ---------------------------------------------------------------

    pub(crate) fn emit_text(&self, message: &str, severity: Severity) {
        if let Some(cb) = &self.on_text {
            cb(message, severity);
        }
    }

    pub(crate) fn emit_status(&self, status: ApiStatus) {
        if let Some(cb) = &self.on_status {
            cb(status);
        }
    }

    pub(crate) fn emit_send(&self, raw: &str) {
        if let Some(cb) = &self.on_send {
            cb(raw);
        }
    }

    pub(crate) fn emit_receive(&self, raw: &str) {
        if let Some(cb) = &self.on_receive {
            cb(raw);
        }
    }

    pub(crate) fn emit_refresh_list(&self) {
        if let Some(cb) = &self.on_refresh_list {
            cb();
        }
    }
}
