//! Single-flight guard for logical operations.
//!
//! A logical operation ("Refreshing title list") may span several commands
//! and a throttle wait; the guard rejects starting a second one while the
//! first is outstanding, and carries the per-operation bookkeeping used for
//! caller messaging.

use crate::event_handlers::EventHandlers;
use crate::models::{ActiveQuery, Severity};
use crate::status::StatusCell;
use log::debug;
use std::sync::{Arc, Mutex, PoisonError};

/// Enforces at most one non-completed [`ActiveQuery`] at a time.
pub struct SingleFlightGuard {
    active: Mutex<Option<ActiveQuery>>,
    handlers: EventHandlers,
    status: Arc<StatusCell>,
}

impl SingleFlightGuard {
    pub(crate) fn new(handlers: EventHandlers, status: Arc<StatusCell>) -> Self {
        Self {
            active: Mutex::new(None),
            handlers,
            status,
        }
    }

    /// Begin a logical operation.
    ///
    /// Returns `false` without changing any state when a prior operation
    /// has not completed ("Wait until {name} is done." is emitted at Error
    /// severity). Otherwise installs a fresh record and announces
    /// "Running {name}..." at Normal severity.
    pub fn start_operation(
        &self,
        name: &str,
        refresh_on_throttle: bool,
        extra_throttle_warning: Option<String>,
        ignore_date_limit: bool,
    ) -> bool {
        let blocking = {
            let mut active = self.lock();
            match active.as_ref() {
                Some(current) if !current.completed => Some(current.name.clone()),
                _ => {
                    *active = Some(ActiveQuery::new(
                        name,
                        refresh_on_throttle,
                        extra_throttle_warning,
                        ignore_date_limit,
                    ));
                    None
                }
            }
        };

        match blocking {
            Some(busy_name) => {
                debug!("[VNDB_GUARD] rejected '{name}': '{busy_name}' still running");
                self.handlers
                    .emit_text(&format!("Wait until {busy_name} is done."), Severity::Error);
                false
            }
            None => {
                debug!("[VNDB_GUARD] started '{name}'");
                self.handlers
                    .emit_text(&format!("Running {name}..."), Severity::Normal);
                true
            }
        }
    }

    /// Set the completion report the operation body wants shown when it
    /// ends. Last write wins. Ignored when no operation is active.
    pub fn set_completion(&self, message: impl Into<String>, severity: Severity) {
        let mut active = self.lock();
        if let Some(current) = active.as_mut() {
            current.completion_message = Some(message.into());
            current.completion_severity = severity;
        }
    }

    /// End the current operation: mark it completed, emit its stored
    /// completion report, and re-fire the status callback so observers see
    /// final status after operation bookkeeping.
    pub fn end_operation(&self) {
        let completion = {
            let mut active = self.lock();
            match active.as_mut() {
                Some(current) => {
                    current.completed = true;
                    current
                        .completion_message
                        .clone()
                        .map(|message| (message, current.completion_severity))
                }
                None => None,
            }
        };

        if let Some((message, severity)) = completion {
            self.handlers.emit_text(&message, severity);
        }
        self.status.announce();
    }

    /// Snapshot of the current operation record, if any.
    pub fn current(&self) -> Option<ActiveQuery> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ActiveQuery>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
