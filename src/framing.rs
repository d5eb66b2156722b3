//! Wire framing and response classification.
//!
//! The protocol delimits messages with a single reserved byte (EOT, 0x04);
//! there is no length prefix. A request is the UTF-8 command followed by the
//! terminator; a response is `<keyword>[ <payload>]` followed by the
//! terminator.

use crate::error::{Result, VndbLinkError};
use crate::models::{ErrorDetail, Response, ResponseKind};
use log::warn;

/// End-of-message byte. Reserved; must never appear inside a command.
pub const TERMINATOR: u8 = 0x04;

/// Encode a command string into terminated wire bytes.
pub fn encode_command(command: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(command.len() + 1);
    bytes.extend_from_slice(command.as_bytes());
    bytes.push(TERMINATOR);
    bytes
}

/// Decode received message bytes into text.
///
/// Accepts the message with or without its trailing terminator (the
/// transport already strips it). Fails only on invalid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Result<&str> {
    let body = match bytes.last() {
        Some(&TERMINATOR) => &bytes[..bytes.len() - 1],
        _ => bytes,
    };
    std::str::from_utf8(body)
        .map_err(|e| VndbLinkError::InvalidPayload(format!("response is not valid UTF-8: {e}")))
}

/// Decode and classify a received message in one step.
pub fn decode_message(bytes: &[u8]) -> Result<Response> {
    Ok(classify(decode_text(bytes)?))
}

/// Classify a decoded message by its leading keyword.
///
/// Splits at the first space into keyword and payload (payload empty when
/// there is no space). Total for every well-formed message, including
/// unrecognized keywords and unparseable `error` payloads.
///
/// # Panics
///
/// A message with no keyword before the separating space violates the
/// framing invariant. That is a programming-error class, not a runtime
/// condition to recover from, so this function panics.
pub fn classify(message: &str) -> Response {
    let (keyword, payload) = match message.find(' ') {
        Some(idx) => (&message[..idx], &message[idx + 1..]),
        None => (message, ""),
    };

    if keyword.is_empty() && !message.is_empty() {
        panic!("protocol framing violated: message has no keyword before the separator");
    }

    let kind = match keyword {
        "ok" => ResponseKind::Ok,
        "results" => ResponseKind::Results,
        "dbstats" => ResponseKind::DbStats,
        "error" => ResponseKind::Error,
        _ => ResponseKind::Unknown,
    };

    let error = if kind == ResponseKind::Error {
        Some(serde_json::from_str(payload).unwrap_or_else(|e| {
            warn!("[VNDB_FRAME] unparseable error payload ({e}); using default record");
            ErrorDetail::default()
        }))
    } else {
        None
    };

    Response {
        kind,
        payload: payload.to_string(),
        error,
    }
}
