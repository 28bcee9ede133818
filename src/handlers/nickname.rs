//! modifyNickname handler.

use super::core::{Context, Handler};
use super::fanout::broadcast;
use crate::error::{HandlerError, HandlerResult};
use chat_proto::{Envelope, ServerMessage, command};
use tracing::{debug, info};

/// Replaces the sender's display name and announces the change to everyone.
pub struct ModifyNicknameHandler;

impl Handler for ModifyNicknameHandler {
    fn handle(&self, ctx: &Context<'_>, msg: &Envelope) -> HandlerResult {
        let new = msg.text().ok_or(HandlerError::MissingField {
            command: command::MODIFY_NICKNAME,
            field: "message",
        })?;

        // A concurrent close may already have removed the sender.
        let Some(old) = ctx.hub.registry.rename(ctx.conn, new.to_string()) else {
            debug!(conn = %ctx.conn, "Rename for unregistered connection ignored");
            return Ok(());
        };

        info!(conn = %ctx.conn, old = %old, new = %new, "Nickname changed");
        broadcast(&ctx.hub.registry, &ServerMessage::renamed(&old, new));
        Ok(())
    }
}
