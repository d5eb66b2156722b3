//! Async client library for the VNDB TCP API.
//!
//! VNDB exposes its database over a custom line-less protocol: one persistent
//! TLS connection carrying `<command><0x04>` requests and
//! `<keyword>[ <payload>]<0x04>` responses. The server enforces cooperative
//! single-flight sessions and rate limiting ("throttling") that clients are
//! expected to detect and wait out.
//!
//! This crate provides:
//!
//! - [`VndbClient`]: builder-constructed handle exposing `open` / `login` /
//!   `execute` / `close`
//! - automatic throttle handling (wait-and-retry with a 5 minute ceiling)
//! - transparent re-login and retry after a mid-session peer reset
//! - TLS with certificate validation, plus the documented plaintext
//!   fallback port
//! - a single-flight operation guard for UI-driven callers
//! - callback hooks for status changes, user-facing messages and raw wire
//!   traffic
//!
//! # Examples
//!
//! ```rust,no_run
//! use vndb_link::{Credentials, VndbClient};
//!
//! # async fn example() -> vndb_link::Result<()> {
//! let client = VndbClient::builder()
//!     .credentials(Credentials::anonymous("myapp", "0.1"))
//!     .build()?;
//!
//! client.open().await?;
//! client.login().await?;
//!
//! let response = client
//!     .execute("dbstats", "Could not fetch database statistics.")
//!     .await?;
//! println!("dbstats: {}", response.payload);
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod active_query;
pub mod client;
pub mod credentials;
pub mod error;
pub mod event_handlers;
pub mod framing;
pub mod models;
pub mod query;
pub mod session;
pub mod timeouts;
pub mod transport;

mod status;

pub use active_query::SingleFlightGuard;
pub use client::{VndbClient, VndbClientBuilder};
pub use credentials::Credentials;
pub use error::{Result, VndbLinkError};
pub use event_handlers::EventHandlers;
pub use models::{
    ActiveQuery, ApiStatus, ErrorDetail, LoginCommand, LoginStatus, Response, ResponseKind,
    Severity,
};
pub use timeouts::Timeouts;
pub use transport::{Endpoint, API_HOST, API_TCP_PORT, API_TLS_PORT};
