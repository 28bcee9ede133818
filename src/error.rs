//! Unified error handling for chatd.
//!
//! Every error here is contained to the connection or the single send that
//! raised it. None of them terminate the server.

use crate::state::ConnId;
use chat_proto::DecodeError;
use thiserror::Error;

// ============================================================================
// Handler Errors (inbound payload processing)
// ============================================================================

/// Errors raised while interpreting an inbound payload.
///
/// Unknown commands are not an error; the command table skips them.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] DecodeError),

    #[error("malformed payload: {command} requires a `{field}` field")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "malformed_payload",
            Self::MissingField { .. } => "missing_field",
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Registry Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A record for this connection is already registered. Indicates a
    /// collaborator bug; the duplicate is not inserted.
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnId),
}

// ============================================================================
// Delivery Errors (per-recipient sends)
// ============================================================================

/// A single outbound send to a single peer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("outbound queue is full")]
    QueueFull,

    #[error("transport is closed")]
    Closed,
}

impl SendError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::QueueFull => "queue_full",
            Self::Closed => "closed",
        }
    }
}

// ============================================================================
// Transport Errors
// ============================================================================

/// A transport-level failure reported by the websocket layer.
///
/// Reported only; the connection stays registered until a close is observed.
#[derive(Debug, Clone, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_payload_wraps_decode_error() {
        let decode = chat_proto::Envelope::from_text("not json").unwrap_err();
        let err = HandlerError::from(decode);
        assert_eq!(err.error_code(), "malformed_payload");
        assert!(err.to_string().starts_with("malformed payload"));
    }

    #[test]
    fn send_error_codes_are_distinct() {
        assert_ne!(SendError::QueueFull.error_code(), SendError::Closed.error_code());
    }
}
