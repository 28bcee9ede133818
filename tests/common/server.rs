//! Test server management.
//!
//! Spawns and manages chatd instances for integration testing.

use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Liveness interval long enough that no sweep fires during a test.
pub const QUIET_LIVENESS_MS: u64 = 600_000;

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a server whose liveness monitor stays out of the way.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with_liveness(port, QUIET_LIVENESS_MS).await
    }

    /// Spawn a server with a custom liveness interval.
    pub async fn spawn_with_liveness(port: u16, interval_ms: u64) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
name = "test.chatd"

[listen]
address = "127.0.0.1:{port}"

[liveness]
interval_ms = {interval_ms}
"#
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_chatd"))
            .arg(&config_path)
            .env("RUST_LOG", "chatd=debug")
            .stdout(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };

        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    ///
    /// A bare TCP probe fails the websocket handshake, so it never joins the
    /// chat or consumes a default nickname.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the websocket URL of the server.
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}/", self.port)
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.url()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
