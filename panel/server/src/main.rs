//! LED control panel server.
//!
//! Serves the embedded panel, accepts LED commands and forwards them to the
//! microcontroller, collects device registrations and sensor data, and
//! streams updates to every open panel.

mod config;
mod device;
mod error;
mod routes;
mod state;
mod store;

use anyhow::Context;
use clap::Parser;
use config::Config;
use device::DeviceClient;
use state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("led_server=info,tower_http=info")),
        )
        .init();

    let config = Config::parse();

    let device = if config.offline {
        info!("offline mode, LED commands are stored only");
        None
    } else {
        let client = DeviceClient::new(&config.device_url, config.device_timeout())
            .context("failed to create device client")?;
        info!(url = client.control_url(), "forwarding LED commands");
        Some(client)
    };

    let app = routes::router(AppState::new(device));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("panel running on http://{}", config.bind);
    info!("  POST /control-led, GET /api/led-state, GET /api/events");
    info!("  POST /api/register-device, GET /api/devices");
    info!("  POST /api/sensor, GET /api/sensors/{{type}}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
