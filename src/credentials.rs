//! Login credentials retained for automatic re-login.
//!
//! The session stores the credentials it logged in with so a mid-session
//! peer reset can be recovered by reopening the transport and replaying the
//! login transparently.

use crate::models::{LoginCommand, PROTOCOL_VERSION};
use serde::{Deserialize, Serialize};

/// Credentials for a VNDB session.
///
/// The client name and version are mandatory (the server rejects logins
/// without them); the username/password pair is optional — anonymous
/// sessions are read-only but fully functional.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    /// Registered client name sent in the login command.
    pub client_name: String,
    /// Client version sent in the login command.
    pub client_version: String,
    /// Account username, if logging in with an account.
    pub username: Option<String>,
    /// Account password. Never logged.
    pub password: Option<String>,
}

impl Credentials {
    /// Anonymous credentials (client name/version only).
    pub fn anonymous(client_name: impl Into<String>, client_version: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            client_version: client_version.into(),
            username: None,
            password: None,
        }
    }

    /// Credentials with a user account.
    pub fn with_account(
        client_name: impl Into<String>,
        client_version: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            client_version: client_version.into(),
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Whether these credentials carry a user account.
    pub fn has_account(&self) -> bool {
        self.username.is_some()
    }

    /// Username for log output, or "(anonymous)".
    pub fn display_user(&self) -> &str {
        self.username.as_deref().unwrap_or("(anonymous)")
    }

    /// Build the login command body for these credentials.
    pub fn login_command(&self) -> LoginCommand {
        LoginCommand {
            protocol: PROTOCOL_VERSION,
            client: self.client_name.clone(),
            clientver: self.client_version.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

// Manual Debug so the password cannot leak into logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_name", &self.client_name)
            .field("client_version", &self.client_version)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
