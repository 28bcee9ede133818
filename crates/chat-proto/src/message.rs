//! Outbound server payloads.

use serde::{Deserialize, Serialize};

/// Display name used for every server-originated notification.
pub const SYSTEM_NICKNAME: &str = "System";

/// A payload the server fans out to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// System notice (join, leave, rename). `nickname` is always
    /// [`SYSTEM_NICKNAME`] when built through [`ServerMessage::notification`].
    Notification {
        /// Sender display name.
        nickname: String,
        /// Human-readable notice text.
        message: String,
    },
    /// A chat line relayed from a client.
    Message {
        /// Display name of the sending client at the time it spoke.
        nickname: String,
        /// The chat text, unmodified.
        message: String,
    },
}

impl ServerMessage {
    /// Build a system notification.
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            nickname: SYSTEM_NICKNAME.to_string(),
            message: message.into(),
        }
    }

    /// Build a chat message attributed to `nickname`.
    pub fn chat(nickname: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Message {
            nickname: nickname.into(),
            message: message.into(),
        }
    }

    /// Notification announcing a new connection.
    pub fn joined(nickname: &str) -> Self {
        Self::notification(format!("User {nickname} joined the chat!"))
    }

    /// Notification announcing a closed connection.
    pub fn left(nickname: &str) -> Self {
        Self::notification(format!("User {nickname} left the chat!"))
    }

    /// Notification announcing a display name change.
    pub fn renamed(old: &str, new: &str) -> Self {
        Self::notification(format!("{old} changed nickname to {new}"))
    }

    /// The `nickname` field, whichever variant this is.
    pub fn nickname(&self) -> &str {
        match self {
            Self::Notification { nickname, .. } | Self::Message { nickname, .. } => nickname,
        }
    }

    /// The `message` field, whichever variant this is.
    pub fn text(&self) -> &str {
        match self {
            Self::Notification { message, .. } | Self::Message { message, .. } => message,
        }
    }

    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
