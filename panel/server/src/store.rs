//! In-memory panel state: LED levels, registered devices, sensor log.

use chrono::Utc;
use led_shared::{Device, DeviceRegistration, LedState, SensorReading, SensorReport};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// Oldest readings are dropped beyond this many.
pub const SENSOR_LOG_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
pub struct PanelStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    leds: LedState,
    devices: HashMap<String, Device>,
    readings: VecDeque<SensorReading>,
}

impl PanelStore {
    pub async fn leds(&self) -> LedState {
        self.inner.read().await.leds
    }

    /// Store `leds` and run `then` before the write lock is released.
    ///
    /// Concurrent updates run `then` in the same order they are stored.
    pub async fn set_leds_then<R>(&self, leds: LedState, then: impl FnOnce() -> R) -> R {
        let mut inner = self.inner.write().await;
        inner.leds = leds;
        then()
    }

    /// Insert or replace the device by name, stamping `last_seen`.
    pub async fn register_device(&self, registration: DeviceRegistration) -> Device {
        let device = Device {
            name: registration.name,
            ip: registration.ip,
            kind: registration.kind,
            last_seen: Utc::now(),
        };
        self.inner
            .write()
            .await
            .devices
            .insert(device.name.clone(), device.clone());
        device
    }

    /// Registered devices, most recently seen first.
    pub async fn devices(&self) -> Vec<Device> {
        let mut devices: Vec<_> = self.inner.read().await.devices.values().cloned().collect();
        devices.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then_with(|| a.name.cmp(&b.name)));
        devices
    }

    /// Append every sample of `report`; returns how many were stored.
    pub async fn record(&self, report: &SensorReport) -> usize {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        for sample in &report.sensors {
            if inner.readings.len() == SENSOR_LOG_CAPACITY {
                inner.readings.pop_front();
            }
            inner.readings.push_back(SensorReading {
                device: report.device.clone(),
                kind: sample.kind.clone(),
                value: sample.value,
                recorded_at: now,
            });
        }
        report.sensors.len()
    }

    /// Up to `limit` readings of one sensor type, newest first.
    pub async fn latest_readings(&self, kind: &str, limit: usize) -> Vec<SensorReading> {
        self.inner
            .read()
            .await
            .readings
            .iter()
            .rev()
            .filter(|r| r.kind == kind)
            .take(limit)
            .cloned()
            .collect()
    }
}
