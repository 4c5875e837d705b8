//! Wire types shared by the LED panel server and its egui frontend.
//!
//! This crate compiles for both the server and the WASM target, so it only
//! depends on serde and chrono.

pub mod event;
pub mod led;
pub mod reply;
pub mod telemetry;

pub use event::{MessageKind, PanelEvent};
pub use led::{LedId, LedState, Level, LevelError};
pub use reply::CommandReply;
pub use telemetry::{Device, DeviceRegistration, SensorReading, SensorReport, SensorSample};

/// Endpoint the panel posts LED commands to.
pub const CONTROL_LED_PATH: &str = "/control-led";

/// Server-sent event stream of [`PanelEvent`]s.
pub const EVENTS_PATH: &str = "/api/events";

/// Endpoint exposed by the microcontroller firmware.
pub const DEVICE_CONTROL_PATH: &str = "/api/control-led";
