//! Connection lifecycle state machine.
//!
//! `CONNECTING -> OPEN -> CLOSED`. The machine knows nothing about
//! websockets: the transport adapter in `connection/mod.rs` turns frames into
//! [`ConnectionEvent`]s and feeds them in order.

use crate::error::{RegistryError, TransportError};
use crate::handlers::{Context, Registry, broadcast};
use crate::network::liveness;
use crate::state::{ConnId, ConnectionRecord, Hub, Peer};
use chat_proto::ServerMessage;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Transport events for one connection, in delivery order.
#[derive(Debug)]
pub enum ConnectionEvent {
    /// An inbound data frame (text or binary).
    Data(Vec<u8>),
    /// The peer answered a liveness probe.
    ProbeResponse,
    /// The transport is gone: client close, forced termination, or a dead
    /// socket. `code` is the websocket close code when the client sent one.
    Closed { code: Option<u16>, reason: String },
    /// A transport-level failure. Reported only; does not close.
    Error(TransportError),
}

/// Drives one connection through its lifecycle.
pub struct Lifecycle {
    id: ConnId,
    state: ConnectionState,
    hub: Arc<Hub>,
    commands: Arc<Registry>,
    peer: Arc<dyn Peer>,
    /// Set only once this lifecycle's record was inserted. A rejected
    /// duplicate must never touch the record that owns its id.
    registered: bool,
}

impl Lifecycle {
    /// A lifecycle for a transport that has just been accepted.
    pub fn new(hub: Arc<Hub>, commands: Arc<Registry>, peer: Arc<dyn Peer>) -> Self {
        let id = hub.next_conn_id();
        Self {
            id,
            state: ConnectionState::Connecting,
            hub,
            commands,
            peer,
            registered: false,
        }
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Register the connection under a default name and announce it.
    ///
    /// On a duplicate registration the existing record is kept, nothing is
    /// announced, and the connection still proceeds to `Open`.
    pub fn open(&mut self) -> Result<(), RegistryError> {
        if self.state != ConnectionState::Connecting {
            return Ok(());
        }
        self.state = ConnectionState::Open;

        let nickname = self.hub.next_default_nickname();
        let record = ConnectionRecord::new(self.id, nickname.clone(), Arc::clone(&self.peer));
        if let Err(e) = self.hub.registry.add(record) {
            warn!(conn = %self.id, error = %e, "Duplicate registration ignored");
            return Err(e);
        }
        self.registered = true;

        crate::metrics::client_connected();
        info!(conn = %self.id, nick = %nickname, "Client joined");
        broadcast(&self.hub.registry, &ServerMessage::joined(&nickname));
        Ok(())
    }

    /// Handle one transport event and return the resulting state.
    pub fn handle(&mut self, event: ConnectionEvent) -> ConnectionState {
        match self.state {
            ConnectionState::Open => self.handle_open(event),
            ConnectionState::Connecting => {
                if let ConnectionEvent::Closed { .. } = event {
                    self.state = ConnectionState::Closed;
                } else {
                    debug!(conn = %self.id, event = ?event, "Event before open ignored");
                }
            }
            ConnectionState::Closed => {
                debug!(conn = %self.id, event = ?event, "Event after close ignored");
            }
        }
        self.state
    }

    fn handle_open(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Data(_) | ConnectionEvent::ProbeResponse if !self.registered => {
                debug!(conn = %self.id, event = ?event, "Event for unregistered connection ignored");
            }
            ConnectionEvent::Data(raw) => {
                let ctx = Context::new(self.id, &self.hub);
                if let Err(e) = self.commands.dispatch_raw(&ctx, &raw) {
                    warn!(conn = %self.id, error = %e, "Dropping inbound payload");
                }
            }
            ConnectionEvent::ProbeResponse => {
                liveness::acknowledge(&self.hub.registry, self.id);
            }
            ConnectionEvent::Closed { code, reason } => self.close(code, &reason),
            ConnectionEvent::Error(e) => {
                warn!(conn = %self.id, error = %e, "Transport error");
            }
        }
    }

    /// Remove the record and announce the departure. Runs at most once.
    fn close(&mut self, code: Option<u16>, reason: &str) {
        self.state = ConnectionState::Closed;
        info!(conn = %self.id, code = ?code, reason = %reason, "Client closed");

        if !std::mem::take(&mut self.registered) {
            return;
        }
        let Some(record) = self.hub.registry.remove(self.id) else {
            return;
        };
        crate::metrics::client_disconnected();
        broadcast(&self.hub.registry, &ServerMessage::left(&record.nickname));
    }
}
