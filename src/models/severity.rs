use serde::{Deserialize, Serialize};

/// Severity of a user-facing text notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    /// Informational progress messages ("Running ...").
    Normal,
    /// Non-fatal conditions the user should see (throttle waits).
    Warning,
    /// Failed operations.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}
