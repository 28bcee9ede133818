//! Command handler registry and dispatch.
//!
//! The `Registry` decodes inbound payloads and routes them by their `type`
//! field. Unknown commands are skipped so that newer clients can talk to
//! older servers.

use super::context::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::messaging::SendChatMessageHandler;
use crate::handlers::nickname::ModifyNicknameHandler;
use chat_proto::{Envelope, command};
use std::collections::HashMap;
use tracing::{Level, debug, span};

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        handlers.insert(command::MODIFY_NICKNAME, Box::new(ModifyNicknameHandler));
        handlers.insert(command::SEND_CHAT_MESSAGE, Box::new(SendChatMessageHandler));

        Self { handlers }
    }

    /// Decode a raw inbound frame and dispatch it.
    ///
    /// Malformed frames are returned as errors for the caller to report; they
    /// cause no broadcast and no state change.
    pub fn dispatch_raw(&self, ctx: &Context<'_>, raw: &[u8]) -> HandlerResult {
        let envelope = Envelope::from_bytes(raw).map_err(|e| {
            let e = HandlerError::from(e);
            crate::metrics::record_protocol_error(e.error_code());
            e
        })?;
        self.dispatch(ctx, &envelope)
    }

    /// Dispatch a decoded envelope to the appropriate handler.
    pub fn dispatch(&self, ctx: &Context<'_>, msg: &Envelope) -> HandlerResult {
        let Some(handler) = self.handlers.get(msg.command()) else {
            debug!(conn = %ctx.conn, command = %msg.command(), "Ignoring unknown command");
            return Ok(());
        };

        let _span = span!(Level::DEBUG, "chat.command", command = %msg.command(), conn = %ctx.conn)
            .entered();
        crate::metrics::record_command(msg.command());

        let result = handler.handle(ctx, msg);
        if let Err(ref e) = result {
            crate::metrics::record_protocol_error(e.error_code());
        }
        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
