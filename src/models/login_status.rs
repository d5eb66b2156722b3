use serde::{Deserialize, Serialize};

/// Authentication state of the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoginStatus {
    /// No login has been performed on the current connection.
    LoggedOut,
    /// Logged in anonymously (client name/version only).
    LoggedIn,
    /// Logged in with a username and password.
    LoggedInWithCredentials,
}

impl std::fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginStatus::LoggedOut => write!(f, "LoggedOut"),
            LoginStatus::LoggedIn => write!(f, "LoggedIn"),
            LoginStatus::LoggedInWithCredentials => write!(f, "LoggedInWithCredentials"),
        }
    }
}
