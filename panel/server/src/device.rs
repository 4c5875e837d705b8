//! Forwarding LED commands to the microcontroller.

use led_shared::{DEVICE_CONTROL_PATH, LedState};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to contact {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Rejected { url: String, status: StatusCode },

    #[error("device forwarder stopped")]
    Stopped,
}

/// HTTP client for the firmware's `/api/control-led` endpoint.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    control_url: String,
}

impl DeviceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeviceError> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .map_err(DeviceError::Client)?;
        let control_url = format!("{}{DEVICE_CONTROL_PATH}", base_url.trim_end_matches('/'));
        Ok(Self { http, control_url })
    }

    pub fn control_url(&self) -> &str {
        &self.control_url
    }

    /// POST `leds` as `{"ledRed": n, "ledGreen": n}`.
    pub async fn send_leds(&self, leds: LedState) -> Result<(), DeviceError> {
        let response = self
            .http
            .post(&self.control_url)
            .json(&leds)
            .send()
            .await
            .map_err(|source| DeviceError::Unreachable {
                url: self.control_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Rejected {
                url: self.control_url.clone(),
                status,
            });
        }

        tracing::debug!(url = %self.control_url, ?leds, "device accepted LED command");
        Ok(())
    }
}

type Job = (LedState, oneshot::Sender<Result<(), DeviceError>>);

/// Sends queued commands to the device one at a time, in queue order.
#[derive(Debug, Clone)]
pub struct DeviceForwarder {
    jobs: mpsc::UnboundedSender<Job>,
}

impl DeviceForwarder {
    /// Start the forwarding task on the current runtime.
    pub fn spawn(client: DeviceClient) -> Self {
        let (jobs, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some((leds, reply)) = rx.recv().await {
                let _ = reply.send(client.send_leds(leds).await);
            }
            tracing::debug!(url = %client.control_url, "device forwarder finished");
        });
        Self { jobs }
    }

    /// Queue `leds` behind every earlier command.
    ///
    /// Queueing happens immediately; the returned future resolves once the
    /// device has answered this command.
    pub fn enqueue(
        &self,
        leds: LedState,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send + use<> {
        let (tx, rx) = oneshot::channel();
        let queued = self.jobs.send((leds, tx)).is_ok();
        async move {
            if !queued {
                return Err(DeviceError::Stopped);
            }
            rx.await.unwrap_or(Err(DeviceError::Stopped))
        }
    }
}
