//! Test websocket client.
//!
//! Speaks the chat JSON protocol for integration testing and asserts on the
//! payloads the server fans out.

use chat_proto::ServerMessage;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A test chat client.
pub struct TestClient {
    ws: Ws,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (ws, _response) = connect_async(url).await?;
        Ok(Self { ws })
    }

    /// Send a raw text frame.
    pub async fn send_raw(&mut self, text: &str) -> anyhow::Result<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Send a command envelope.
    pub async fn send_command(&mut self, command: &str, message: &str) -> anyhow::Result<()> {
        let payload = serde_json::json!({ "type": command, "message": message });
        self.send_raw(&payload.to_string()).await
    }

    pub async fn rename(&mut self, nickname: &str) -> anyhow::Result<()> {
        self.send_command("modifyNickname", nickname).await
    }

    pub async fn say(&mut self, text: &str) -> anyhow::Result<()> {
        self.send_command("sendChatMessage", text).await
    }

    /// Receive a single payload from the server.
    pub async fn recv(&mut self) -> anyhow::Result<ServerMessage> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a payload with a timeout. Control frames are skipped; pings
    /// are answered by tungstenite while reading.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<ServerMessage> {
        timeout(dur, async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                    Some(Ok(Message::Close(frame))) => anyhow::bail!("Server closed: {frame:?}"),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                    None => anyhow::bail!("Connection closed"),
                }
            }
        })
        .await?
    }

    /// Receive payloads until the given predicate returns true.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<ServerMessage>>
    where
        F: FnMut(&ServerMessage) -> bool,
    {
        let mut messages = Vec::new();
        loop {
            let msg = self.recv().await?;
            let done = predicate(&msg);
            messages.push(msg);
            if done {
                return Ok(messages);
            }
        }
    }

    /// Assert that nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.recv_timeout(dur).await {
            Ok(msg) => anyhow::bail!("Unexpected payload: {msg:?}"),
            Err(e) if e.is::<tokio::time::error::Elapsed>() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Perform a graceful websocket close.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
