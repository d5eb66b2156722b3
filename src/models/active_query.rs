use crate::models::Severity;

/// Bookkeeping record for the currently running logical operation.
///
/// Created by [`SingleFlightGuard::start_operation`] and marked completed by
/// [`SingleFlightGuard::end_operation`]. At most one non-completed record
/// exists at any time.
///
/// [`SingleFlightGuard::start_operation`]: crate::active_query::SingleFlightGuard::start_operation
/// [`SingleFlightGuard::end_operation`]: crate::active_query::SingleFlightGuard::end_operation
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveQuery {
    /// User-facing operation name ("Refreshing title list", ...).
    pub name: String,
    /// Fire the refresh-list callback when this operation is throttled.
    pub refresh_on_throttle: bool,
    /// Extra warning text shown alongside the throttle message, if any.
    pub extra_throttle_warning: Option<String>,
    /// Caller bookkeeping: skip release-date limits for this operation.
    pub ignore_date_limit: bool,
    /// Set once the operation has ended.
    pub completed: bool,
    /// Completion report set by the operation body before it ends.
    pub completion_message: Option<String>,
    /// Severity the completion report is emitted at.
    pub completion_severity: Severity,
}

impl ActiveQuery {
    pub fn new(
        name: impl Into<String>,
        refresh_on_throttle: bool,
        extra_throttle_warning: Option<String>,
        ignore_date_limit: bool,
    ) -> Self {
        Self {
            name: name.into(),
            refresh_on_throttle,
            extra_throttle_warning,
            ignore_date_limit,
            completed: false,
            completion_message: None,
            completion_severity: Severity::Normal,
        }
    }
}
