//! sendChatMessage handler.

use super::core::{Context, Handler};
use super::fanout::broadcast;
use crate::error::{HandlerError, HandlerResult};
use chat_proto::{Envelope, ServerMessage, command};
use tracing::debug;

/// Relays the sender's text, unmodified, to every connection.
pub struct SendChatMessageHandler;

impl Handler for SendChatMessageHandler {
    fn handle(&self, ctx: &Context<'_>, msg: &Envelope) -> HandlerResult {
        let text = msg.text().ok_or(HandlerError::MissingField {
            command: command::SEND_CHAT_MESSAGE,
            field: "message",
        })?;

        let Some(nickname) = ctx.nickname() else {
            debug!(conn = %ctx.conn, "Chat message from unregistered connection dropped");
            return Ok(());
        };

        broadcast(&ctx.hub.registry, &ServerMessage::chat(nickname, text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::RecordingPeer;
    use crate::state::{ConnId, ConnectionRecord, Hub};

    #[test]
    fn sender_receives_its_own_message() {
        let hub = Hub::default();
        let sender = RecordingPeer::new();
        let other = RecordingPeer::new();
        hub.registry
            .add(ConnectionRecord::new(ConnId(1), "Alice".into(), sender.clone()))
            .unwrap();
        hub.registry
            .add(ConnectionRecord::new(ConnId(2), "Bob".into(), other.clone()))
            .unwrap();

        let ctx = Context::new(ConnId(1), &hub);
        SendChatMessageHandler
            .handle(&ctx, &Envelope::new("sendChatMessage", Some(" hi <b>there</b> ".into())))
            .unwrap();

        let expected = ServerMessage::chat("Alice", " hi <b>there</b> ");
        assert_eq!(sender.messages(), vec![expected.clone()]);
        assert_eq!(other.messages(), vec![expected]);
    }

    #[test]
    fn missing_message_field_is_malformed() {
        let hub = Hub::default();
        let peer = RecordingPeer::new();
        hub.registry
            .add(ConnectionRecord::new(ConnId(1), "Alice".into(), peer.clone()))
            .unwrap();

        let ctx = Context::new(ConnId(1), &hub);
        let err = SendChatMessageHandler
            .handle(&ctx, &Envelope::new("sendChatMessage", None))
            .unwrap_err();
        assert_eq!(err.error_code(), "missing_field");
        assert!(peer.sent().is_empty());
    }
}
