//! chatd - broadcast chat daemon over WebSocket.

use chatd::config::{Config, validation};
use chatd::handlers::Registry;
use chatd::network::{Gateway, LivenessMonitor};
use chatd::state::{Hub, HubSettings};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.name,
        listen = %config.listen.address,
        liveness_ms = config.liveness.interval_ms,
        "Starting chatd"
    );

    chatd::metrics::init();

    let hub = Arc::new(Hub::new(HubSettings::from(&config)));
    let commands = Arc::new(Registry::new());
    let shutdown = CancellationToken::new();

    let monitor = LivenessMonitor::new(Arc::clone(&hub), config.liveness.interval())
        .spawn(shutdown.clone());

    if let Some(http) = &config.http {
        tokio::spawn(chatd::http::run_http_server(http.address, shutdown.clone()));
    }

    let gateway = Gateway::bind(&config.listen, Arc::clone(&hub), commands).await?;
    info!(address = %gateway.local_addr()?, "Accepting chat clients");
    let gateway = tokio::spawn(gateway.run(shutdown.clone()));

    tokio::signal::ctrl_c().await?;
    info!(connections = hub.registry.len(), "Shutdown requested");
    shutdown.cancel();

    let _ = gateway.await;
    let _ = monitor.await;
    info!("chatd stopped");

    Ok(())
}
