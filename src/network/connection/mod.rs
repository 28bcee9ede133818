//! Connection - Handles an individual websocket client.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//!    ┌───────────────────────────────────────────────────────┐
//!    │                 Connection Task                       │
//!    │                                                       │
//!    │  ws reader ──▶ ConnectionEvent ──▶ Lifecycle (FSM)    │
//!    │                                      │                │
//!    │                         Registry / Broadcast          │
//!    │                                      │                │
//!    │  ws writer ◀── Outbound queue ◀── WsPeer (any task)   │
//!    └───────────────────────────────────────────────────────┘
//! ```
//!
//! Events of one connection reach the lifecycle in the order the socket
//! delivered them.

mod lifecycle;
mod peer;

pub use lifecycle::{ConnectionEvent, ConnectionState, Lifecycle};
pub use peer::{Outbound, WsPeer};

use crate::error::TransportError;
use crate::handlers::Registry;
use crate::state::Hub;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

/// How long a graceful close waits for queued frames to flush.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

/// A websocket client connection handler.
pub struct Connection {
    addr: SocketAddr,
    hub: Arc<Hub>,
    commands: Arc<Registry>,
    stream: WebSocketStream<TcpStream>,
}

impl Connection {
    pub fn new(
        stream: WebSocketStream<TcpStream>,
        addr: SocketAddr,
        hub: Arc<Hub>,
        commands: Arc<Registry>,
    ) -> Self {
        Self {
            addr,
            hub,
            commands,
            stream,
        }
    }

    /// Run the connection until the transport closes or is terminated.
    pub async fn run(self) {
        let (sink, source) = self.stream.split();
        let (tx, rx) = mpsc::channel(self.hub.settings.outbound_queue);
        let kill = CancellationToken::new();
        let peer = Arc::new(WsPeer::new(tx, kill.clone()));

        let mut lifecycle = Lifecycle::new(self.hub, self.commands, peer);
        let span = info_span!("connection", conn = %lifecycle.id(), addr = %self.addr);

        async move {
            let mut writer = tokio::spawn(write_loop(sink, rx, kill.clone()).in_current_span());

            // Failure is logged inside; the connection proceeds unregistered.
            let _ = lifecycle.open();
            read_loop(source, &mut lifecycle, &kill).await;

            // Release our sender; the writer drains and closes once in-flight
            // broadcasts drop their clones.
            drop(lifecycle);
            if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
                kill.cancel();
                let _ = writer.await;
            }
        }
        .instrument(span)
        .await
    }
}

async fn read_loop(mut source: WsSource, lifecycle: &mut Lifecycle, kill: &CancellationToken) {
    loop {
        let event = tokio::select! {
            _ = kill.cancelled() => ConnectionEvent::Closed {
                code: None,
                reason: "terminated".to_string(),
            },
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => ConnectionEvent::Data(text.into_bytes()),
                Some(Ok(Message::Binary(bytes))) => ConnectionEvent::Data(bytes),
                Some(Ok(Message::Pong(_))) => ConnectionEvent::ProbeResponse,
                // Pings are answered by tungstenite itself.
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Frame(_))) => continue,
                Some(Ok(Message::Close(frame))) => ConnectionEvent::Closed {
                    code: frame.as_ref().map(|f| u16::from(f.code)),
                    reason: frame.map(|f| f.reason.into_owned()).unwrap_or_default(),
                },
                Some(Err(e)) => {
                    lifecycle.handle(ConnectionEvent::Error(TransportError::from(e)));
                    ConnectionEvent::Closed {
                        code: None,
                        reason: "transport failure".to_string(),
                    }
                }
                None => ConnectionEvent::Closed {
                    code: None,
                    reason: "connection reset".to_string(),
                },
            },
        };

        if lifecycle.handle(event) == ConnectionState::Closed {
            break;
        }
    }
}

async fn write_loop(mut sink: WsSink, mut rx: mpsc::Receiver<Outbound>, kill: CancellationToken) {
    loop {
        let outbound = tokio::select! {
            // Forced termination: drop the socket without a close frame.
            _ = kill.cancelled() => return,
            outbound = rx.recv() => outbound,
        };

        let frame = match outbound {
            Some(Outbound::Text(payload)) => Message::Text(payload.to_string()),
            Some(Outbound::Ping) => Message::Ping(Vec::new()),
            None => {
                let _ = sink.close().await;
                return;
            }
        };

        if let Err(e) = sink.send(frame).await {
            debug!(error = %e, "Write error");
            return;
        }
    }
}
