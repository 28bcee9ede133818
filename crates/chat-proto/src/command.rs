//! Command names recognized in the `type` field of inbound envelopes.

/// Replace the sender's display name with the envelope's `message`.
pub const MODIFY_NICKNAME: &str = "modifyNickname";

/// Broadcast the envelope's `message` as a chat line from the sender.
pub const SEND_CHAT_MESSAGE: &str = "sendChatMessage";
