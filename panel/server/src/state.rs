use crate::device::{DeviceClient, DeviceForwarder};
use crate::store::PanelStore;
use led_shared::PanelEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Events buffered per subscriber before it starts skipping.
const EVENT_BUFFER: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PanelStore>,
    /// `None` when running offline.
    pub device: Option<DeviceForwarder>,
    pub events: broadcast::Sender<PanelEvent>,
}

impl AppState {
    /// Must be called inside a tokio runtime when `device` is set.
    pub fn new(device: Option<DeviceClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            store: Arc::new(PanelStore::default()),
            device: device.map(DeviceForwarder::spawn),
            events,
        }
    }

    /// Push an event to every connected panel.
    pub fn publish(&self, event: PanelEvent) {
        let name = event.name();
        match self.events.send(event) {
            Ok(receivers) => tracing::debug!(event = name, receivers, "published"),
            Err(_) => tracing::trace!(event = name, "no panels connected"),
        }
    }
}
