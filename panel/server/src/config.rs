use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Command line and environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "led-server", version, about = "Serve the LED control panel")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "LED_PANEL_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Base URL of the microcontroller that drives the LEDs.
    #[arg(long, env = "LED_PANEL_DEVICE_URL", default_value = "http://192.168.1.100")]
    pub device_url: String,

    /// Timeout for a single request to the microcontroller.
    #[arg(long, env = "LED_PANEL_DEVICE_TIMEOUT_MS", default_value_t = 2000)]
    pub device_timeout_ms: u64,

    /// Store LED commands without forwarding them to the microcontroller.
    #[arg(long, env = "LED_PANEL_OFFLINE")]
    pub offline: bool,
}

impl Config {
    pub fn device_timeout(&self) -> Duration {
        Duration::from_millis(self.device_timeout_ms)
    }
}
