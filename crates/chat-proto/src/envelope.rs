//! Inbound client envelopes.

use crate::error::DecodeError;
use serde::Deserialize;

/// A decoded client frame: `{ "type": <command>, "message": <string> }`.
///
/// The command name is kept as a string so that unknown commands decode
/// successfully and can be skipped by the receiver. Fields other than
/// `type` and `message` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    command: String,
    #[serde(default)]
    message: Option<String>,
}

impl Envelope {
    /// Build an envelope directly, without going through JSON.
    pub fn new(command: impl Into<String>, message: Option<String>) -> Self {
        Self {
            command: command.into(),
            message,
        }
    }

    /// Decode an envelope from a text frame.
    pub fn from_text(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode an envelope from raw frame bytes, which must be UTF-8 JSON.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        Self::from_text(text)
    }

    /// The command name carried in the `type` field.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The `message` argument, if present.
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
