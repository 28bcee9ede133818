//! Gateway - WebSocket listener that accepts incoming connections.
//!
//! The Gateway binds the listen socket, performs the websocket handshake
//! (with optional `Origin` filtering) and spawns a Connection task per
//! client.

use crate::config::ListenConfig;
use crate::handlers::Registry;
use crate::network::Connection;
use crate::state::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// The Gateway accepts incoming websocket connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    allow_origins: Arc<Vec<String>>,
    hub: Arc<Hub>,
    commands: Arc<Registry>,
}

impl Gateway {
    /// Bind the gateway to the configured address.
    pub async fn bind(
        config: &ListenConfig,
        hub: Arc<Hub>,
        commands: Arc<Registry>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.address).await?;
        info!(address = %config.address, "WebSocket listener bound");

        Ok(Self {
            listener,
            allow_origins: Arc::new(config.allow_origins.clone()),
            hub,
            commands,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` is cancelled.
    #[instrument(skip_all, name = "gateway")]
    pub async fn run(self, shutdown: CancellationToken) {
        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Gateway stopped accepting connections");
                    return;
                }
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, addr)) => {
                    debug!(%addr, "WebSocket connection attempt");
                    let hub = Arc::clone(&self.hub);
                    let commands = Arc::clone(&self.commands);
                    let allowed = Arc::clone(&self.allow_origins);
                    tokio::spawn(handshake_and_run(stream, addr, allowed, hub, commands));
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept WebSocket connection");
                }
            }
        }
    }
}

async fn handshake_and_run(
    stream: TcpStream,
    addr: SocketAddr,
    allowed: Arc<Vec<String>>,
    hub: Arc<Hub>,
    commands: Arc<Registry>,
) {
    let origin_check = |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let origin = req.headers().get("Origin").and_then(|o| o.to_str().ok());
        if origin_allowed(&allowed, origin) {
            return Ok(response);
        }
        warn!(%addr, origin = ?origin, "WebSocket origin rejected");
        let mut reject = ErrorResponse::new(Some("origin not allowed".to_string()));
        *reject.status_mut() = StatusCode::FORBIDDEN;
        Err(reject)
    };

    match accept_hdr_async(stream, origin_check).await {
        Ok(ws_stream) => {
            info!(%addr, "WebSocket handshake successful");
            Connection::new(ws_stream, addr, hub, commands).run().await;
            info!(%addr, "WebSocket connection closed");
        }
        Err(e) => {
            warn!(%addr, error = %e, "WebSocket handshake failed");
        }
    }
}

/// An empty allow list accepts every origin, including a missing header.
fn origin_allowed(allowed: &[String], origin: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match origin {
        Some(origin) => allowed.iter().any(|a| a == origin || a == "*"),
        None => false,
    }
}
