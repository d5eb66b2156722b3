//! Data models for the vndb-link client library.
//!
//! Defines the response value produced by the framer, the login command
//! body, and the status/severity enums surfaced through callbacks.

pub mod active_query;
pub mod api_status;
pub mod error_detail;
pub mod login_command;
pub mod login_status;
pub mod response;
pub mod response_kind;
pub mod severity;

pub use active_query::ActiveQuery;
pub use api_status::ApiStatus;
pub use error_detail::ErrorDetail;
pub use login_command::{LoginCommand, PROTOCOL_VERSION};
pub use login_status::LoginStatus;
pub use response::Response;
pub use response_kind::ResponseKind;
pub use severity::Severity;
