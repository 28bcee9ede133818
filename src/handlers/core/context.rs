//! Command handler context and trait.

use crate::error::HandlerResult;
use crate::state::{ConnId, Hub};
use chat_proto::Envelope;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The sending connection.
    pub conn: ConnId,
    /// Shared server state.
    pub hub: &'a Hub,
}

impl<'a> Context<'a> {
    pub fn new(conn: ConnId, hub: &'a Hub) -> Self {
        Self { conn, hub }
    }

    /// The sender's current display name, if it is still registered.
    pub fn nickname(&self) -> Option<String> {
        self.hub.registry.nickname(self.conn)
    }
}

/// A handler for one inbound command.
///
/// Handlers run to completion without awaiting: every side effect is a
/// registry update or a queued send.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &Context<'_>, msg: &Envelope) -> HandlerResult;
}
