//! Events pushed from the server to every open panel.

use crate::{LedState, SensorReport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Info,
    Error,
}

/// Server push event, encoded as `{"event": "<name>", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PanelEvent {
    /// The LED state changed (from any panel).
    LedUpdate(LedState),
    /// A device reported new sensor values.
    SensorUpdate(SensorReport),
    /// Free-form notice, e.g. a failed device forward.
    ServerMessage { kind: MessageKind, text: String },
}

impl PanelEvent {
    pub fn error(text: impl Into<String>) -> Self {
        PanelEvent::ServerMessage {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        PanelEvent::ServerMessage {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PanelEvent::LedUpdate(_) => "led_update",
            PanelEvent::SensorUpdate(_) => "sensor_update",
            PanelEvent::ServerMessage { .. } => "server_message",
        }
    }
}
