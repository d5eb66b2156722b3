//! Shared API status cell.
//!
//! Status is one of the two pieces of state contended between the issuing
//! task and background continuations (the other is the active query), so it
//! sits behind an explicit mutex rather than relying on cooperative
//! scheduling alone.

use crate::event_handlers::EventHandlers;
use crate::models::ApiStatus;
use log::debug;
use std::sync::{Mutex, PoisonError};

/// Mutex-guarded [`ApiStatus`] that reports transitions through the status
/// callback.
pub(crate) struct StatusCell {
    status: Mutex<ApiStatus>,
    handlers: EventHandlers,
}

impl StatusCell {
    pub fn new(initial: ApiStatus, handlers: EventHandlers) -> Self {
        Self {
            status: Mutex::new(initial),
            handlers,
        }
    }

    pub fn get(&self) -> ApiStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the status, firing the status callback when it changes.
    /// The lock is released before the callback runs.
    pub fn set(&self, next: ApiStatus) {
        let changed = {
            let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = *status != next;
            *status = next;
            changed
        };
        if changed {
            debug!("[VNDB_STATUS] -> {next}");
            self.handlers.emit_status(next);
        }
    }

    /// Set the status to `to` only if it is currently `from`, under one
    /// lock hold; returns whether the transition happened. The lock is
    /// released before the callback runs.
    pub fn transition(&self, from: ApiStatus, to: ApiStatus) -> bool {
        {
            let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            if *status != from {
                return false;
            }
            *status = to;
        }
        if from != to {
            debug!("[VNDB_STATUS] -> {to}");
            self.handlers.emit_status(to);
        }
        true
    }

    /// Re-fire the status callback with the current value, so observers see
    /// final status after operation bookkeeping, not only after the last
    /// network call.
    pub fn announce(&self) {
        self.handlers.emit_status(self.get());
    }
}
