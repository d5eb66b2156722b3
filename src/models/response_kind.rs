use serde::{Deserialize, Serialize};

/// Classification of a server response by its leading keyword.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// `ok` — command accepted, empty or trivial payload.
    Ok,
    /// `results` — query results payload.
    Results,
    /// `dbstats` — database statistics payload.
    DbStats,
    /// `error` — application-level error, payload is a JSON error record.
    Error,
    /// Any keyword the client does not recognize.
    Unknown,
}

impl std::fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseKind::Ok => write!(f, "ok"),
            ResponseKind::Results => write!(f, "results"),
            ResponseKind::DbStats => write!(f, "dbstats"),
            ResponseKind::Error => write!(f, "error"),
            ResponseKind::Unknown => write!(f, "unknown"),
        }
    }
}
