//! Decoding errors.

use thiserror::Error;

/// An inbound frame could not be decoded into an [`Envelope`](crate::Envelope).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame was binary and not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The frame was text but not a JSON object of the expected shape.
    #[error("payload is not a valid envelope: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
