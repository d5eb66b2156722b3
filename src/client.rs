//! Main VNDB client with builder pattern.
//!
//! The client is an explicitly constructed handle — no ambient global
//! connection state — that callers share by cloning (internals are
//! Arc-backed). It is designed for exactly one in-flight logical request at
//! a time, enforced by the single-flight guard; network I/O and throttle
//! waits never block the calling thread.

use crate::active_query::SingleFlightGuard;
use crate::credentials::Credentials;
use crate::error::{Result, VndbLinkError};
use crate::event_handlers::EventHandlers;
use crate::models::{ActiveQuery, ApiStatus, LoginStatus, Response, Severity};
use crate::query::QueryExecutor;
use crate::session::Session;
use crate::status::StatusCell;
use crate::timeouts::Timeouts;
use crate::transport::Endpoint;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Main VNDB API client.
///
/// Use [`VndbClient::builder`] to construct instances.
///
/// # Examples
///
/// ```rust,no_run
/// use vndb_link::{Credentials, VndbClient};
///
/// # async fn example() -> vndb_link::Result<()> {
/// let client = VndbClient::builder()
///     .credentials(Credentials::anonymous("myapp", "0.1"))
///     .build()?;
///
/// client.open().await?;
/// let status = client.login().await?;
/// println!("login: {status}");
///
/// if client.start_operation("Fetching stats", false, None, false) {
///     match client.execute("dbstats", "Could not fetch stats.").await {
///         Ok(_) => client.set_completion("Stats fetched.", vndb_link::Severity::Normal),
///         Err(_) => {} // failure text already routed through the callbacks
///     }
///     client.end_operation();
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VndbClient {
    session: Arc<Mutex<Session>>,
    executor: QueryExecutor,
    guard: Arc<SingleFlightGuard>,
    status: Arc<StatusCell>,
    handlers: EventHandlers,
    credentials: Credentials,
    timeouts: Timeouts,
}

impl VndbClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> VndbClientBuilder {
        VndbClientBuilder::new()
    }

    /// Establish the transport (TCP + TLS handshake, with the documented
    /// plaintext fallback). On failure status becomes Error.
    pub async fn open(&self) -> Result<()> {
        let result = {
            let mut session = self.session.lock().await;
            session.open().await
        };
        if let Err(err) = &result {
            self.status.set(ApiStatus::Error);
            self.handlers.emit_text(&err.to_string(), Severity::Error);
        }
        result
    }

    /// Authenticate with the configured credentials. On success the API
    /// status becomes Ready; the returned string combines login and API
    /// status ("LoggedIn, Ready") and may be ignored.
    ///
    /// Login failures are not transparently retried.
    pub async fn login(&self) -> Result<String> {
        let result = {
            let mut session = self.session.lock().await;
            session.login(self.credentials.clone()).await
        };
        match result {
            Ok(login_status) => {
                self.status.set(ApiStatus::Ready);
                Ok(format!("{login_status}, {}", self.status.get()))
            }
            Err(err) => {
                self.handlers.emit_text(&err.to_string(), Severity::Error);
                Err(err)
            }
        }
    }

    /// Close the connection; status Closed from any state. Safe to call
    /// repeatedly; the client may be reopened afterwards.
    pub async fn close(&self) {
        self.executor.close().await;
    }

    /// Execute a command and return its terminal (non-throttled) response.
    ///
    /// `error_message` is the caller-supplied context routed through the
    /// text callback if the call fails. Throttling is handled internally:
    /// the client waits the server-suggested time (capped at 5 minutes per
    /// occurrence) and re-issues the same command until a non-throttled
    /// outcome.
    pub async fn execute(&self, command: &str, error_message: &str) -> Result<Response> {
        self.executor.execute(command, error_message).await
    }

    /// Begin a logical operation; see [`SingleFlightGuard::start_operation`].
    pub fn start_operation(
        &self,
        name: &str,
        refresh_on_throttle: bool,
        extra_throttle_warning: Option<String>,
        ignore_date_limit: bool,
    ) -> bool {
        self.guard.start_operation(
            name,
            refresh_on_throttle,
            extra_throttle_warning,
            ignore_date_limit,
        )
    }

    /// Set the completion report for the running operation.
    pub fn set_completion(&self, message: impl Into<String>, severity: Severity) {
        self.guard.set_completion(message, severity);
    }

    /// End the running operation and emit its completion report.
    pub fn end_operation(&self) {
        self.guard.end_operation();
    }

    /// Current API status.
    pub fn status(&self) -> ApiStatus {
        self.status.get()
    }

    /// Current login status.
    pub async fn login_status(&self) -> LoginStatus {
        self.session.lock().await.login_status()
    }

    /// Snapshot of the current operation record, if any.
    pub fn active_query(&self) -> Option<ActiveQuery> {
        self.guard.current()
    }

    /// The configured timeouts.
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }
}

/// Builder for configuring [`VndbClient`] instances.
pub struct VndbClientBuilder {
    endpoint: Endpoint,
    credentials: Option<Credentials>,
    handlers: EventHandlers,
    timeouts: Timeouts,
}

impl VndbClientBuilder {
    fn new() -> Self {
        Self {
            endpoint: Endpoint::default(),
            credentials: None,
            handlers: EventHandlers::new(),
            timeouts: Timeouts::default(),
        }
    }

    /// Override the server endpoint (tests, mirrors). Defaults to the
    /// production address.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the login credentials. Required.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Register observer callbacks.
    pub fn event_handlers(mut self, handlers: EventHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Set the timeout configuration.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<VndbClient> {
        let credentials = self.credentials.ok_or_else(|| {
            VndbLinkError::ConfigurationError("credentials are required".to_string())
        })?;
        if credentials.client_name.is_empty() {
            return Err(VndbLinkError::ConfigurationError(
                "client name must not be empty".to_string(),
            ));
        }

        let status = Arc::new(StatusCell::new(ApiStatus::Closed, self.handlers.clone()));
        let guard = Arc::new(SingleFlightGuard::new(self.handlers.clone(), status.clone()));
        let session = Arc::new(Mutex::new(Session::new(
            self.endpoint,
            self.timeouts.clone(),
            self.handlers.clone(),
        )));
        let executor = QueryExecutor::new(
            session.clone(),
            status.clone(),
            guard.clone(),
            self.handlers.clone(),
        );

        Ok(VndbClient {
            session,
            executor,
            guard,
            status,
            handlers: self.handlers,
            credentials,
            timeouts: self.timeouts,
        })
    }
}
