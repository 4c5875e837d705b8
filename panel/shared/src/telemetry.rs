//! Device registration and sensor reports sent by microcontrollers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/register-device`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRegistration {
    pub name: String,
    pub ip: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A registered microcontroller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub ip: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub last_seen: DateTime<Utc>,
}

/// A single measurement inside a [`SensorReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
}

/// Body of `POST /api/sensor`, e.g.
/// `{"device": "ESP32", "sensors": [{"type": "light", "value": 23.7}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReport {
    pub device: String,
    pub sensors: Vec<SensorSample>,
}

/// A stored measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub device: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}
