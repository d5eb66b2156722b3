//! Session: exclusive owner of the transport and the login state.
//!
//! The session is the single place bytes cross the wire. It keeps the
//! credentials it last logged in with so the executor can recover a
//! mid-session peer reset by reopening the transport and replaying the
//! login.

use crate::credentials::Credentials;
use crate::error::{Result, VndbLinkError};
use crate::event_handlers::EventHandlers;
use crate::framing;
use crate::models::{LoginStatus, Response, ResponseKind};
use crate::timeouts::Timeouts;
use crate::transport::{Endpoint, Transport};
use log::{debug, warn};

pub struct Session {
    endpoint: Endpoint,
    timeouts: Timeouts,
    handlers: EventHandlers,
    transport: Option<Transport>,
    login_status: LoginStatus,
    credentials: Option<Credentials>,
}

impl Session {
    pub fn new(endpoint: Endpoint, timeouts: Timeouts, handlers: EventHandlers) -> Self {
        Self {
            endpoint,
            timeouts,
            handlers,
            transport: None,
            login_status: LoginStatus::LoggedOut,
            credentials: None,
        }
    }

    /// Establish the transport. Replaces any previous connection.
    pub async fn open(&mut self) -> Result<()> {
        self.transport = Some(Transport::open(&self.endpoint, &self.timeouts).await?);
        self.login_status = LoginStatus::LoggedOut;
        Ok(())
    }

    /// Whether a transport is currently established.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    pub fn login_status(&self) -> LoginStatus {
        self.login_status
    }

    /// Authenticate on the current connection.
    ///
    /// Uses the low-level send path: login failures are not transparently
    /// retried and never enter the throttle loop. On success the
    /// credentials are retained for automatic re-login.
    pub async fn login(&mut self, credentials: Credentials) -> Result<LoginStatus> {
        let body = serde_json::to_string(&credentials.login_command())
            .map_err(|e| VndbLinkError::ConfigurationError(format!("login command: {e}")))?;
        let command = format!("login {body}");
        debug!("[VNDB_SESSION] logging in as {}", credentials.display_user());

        let response = self.send_raw(&command).await?;
        match response.kind {
            ResponseKind::Ok => {
                self.login_status = if credentials.has_account() {
                    LoginStatus::LoggedInWithCredentials
                } else {
                    LoginStatus::LoggedIn
                };
                self.credentials = Some(credentials);
                debug!("[VNDB_SESSION] login accepted ({})", self.login_status);
                Ok(self.login_status)
            }
            ResponseKind::Error => {
                let message = response
                    .error
                    .as_ref()
                    .and_then(|detail| detail.message().map(str::to_string))
                    .unwrap_or_else(|| response.payload.clone());
                Err(VndbLinkError::AuthenticationError(message))
            }
            other => Err(VndbLinkError::AuthenticationError(format!(
                "unexpected '{other}' response to login"
            ))),
        }
    }

    /// Reopen the transport and replay the stored credentials.
    ///
    /// Used by the executor when a peer reset interrupts a command. Fails
    /// if this session never logged in.
    pub async fn relogin(&mut self) -> Result<()> {
        let credentials = self
            .credentials
            .clone()
            .ok_or_else(|| VndbLinkError::AuthenticationError("no stored credentials for re-login".to_string()))?;
        warn!("[VNDB_SESSION] reopening connection for automatic re-login");
        self.transport = None;
        self.open().await?;
        self.login(credentials).await?;
        Ok(())
    }

    /// Tear the transport down. Teardown errors are logged and swallowed;
    /// safe to call when never opened. The session may be reopened.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(err) = transport.shutdown().await {
                debug!("[VNDB_SESSION] error during shutdown (ignored): {err}");
            }
        }
        self.login_status = LoginStatus::LoggedOut;
    }

    /// Send one command and read its response. The single wire exchange:
    /// encode, emit the outbound hook, write, read, emit the inbound hook,
    /// classify.
    pub async fn send_raw(&mut self, command: &str) -> Result<Response> {
        let transport = self.transport.as_mut().ok_or(VndbLinkError::NotConnected)?;

        self.handlers.emit_send(command);
        transport.write_all(&framing::encode_command(command)).await?;

        let bytes = transport.read_message().await?;
        let text = framing::decode_text(&bytes)?;
        self.handlers.emit_receive(text);
        Ok(framing::classify(text))
    }
}
