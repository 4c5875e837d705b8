//! HTTP surface of the panel server.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use led_panel::{Page, events};
use led_shared::{
    CONTROL_LED_PATH, CommandReply, Device, DeviceRegistration, EVENTS_PATH, LedState,
    PanelEvent, SensorReading, SensorReport,
};
use rust_embed::RustEmbed;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

// Set by build.rs: the wasm-bindgen output, or the bundled fallback page.
#[derive(RustEmbed)]
#[folder = "$LED_FRONTEND_DIST"]
struct Assets;

const DEFAULT_READINGS_LIMIT: usize = 5;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(CONTROL_LED_PATH, post(control_led))
        .route("/api/led-state", get(led_state))
        .route("/api/register-device", post(register_device))
        .route("/api/devices", get(list_devices))
        .route("/api/sensor", post(ingest_sensor_data))
        .route("/api/sensors/{kind}", get(latest_sensor_data))
        .route(EVENTS_PATH, get(event_stream))
        .fallback(led_panel::static_handler::<Assets>)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The panel page, starting from the current LED state.
async fn index(State(state): State<AppState>) -> Page<LedState, Assets> {
    Page::new(state.store.leds().await)
}

async fn control_led(
    State(state): State<AppState>,
    payload: Result<Json<LedState>, JsonRejection>,
) -> Result<Json<CommandReply>, ApiError> {
    let Json(leds) = payload?;

    // Broadcast and queue under the store lock; overlapping commands keep their order.
    let forwarded = state
        .store
        .set_leds_then(leds, || {
            state.publish(PanelEvent::LedUpdate(leds));
            state.device.as_ref().map(|device| device.enqueue(leds))
        })
        .await;
    info!(red = %leds.led_red, green = %leds.led_green, "LED state updated");

    match forwarded {
        Some(outcome) => {
            if let Err(e) = outcome.await {
                state.publish(PanelEvent::error(format!(
                    "Failed to contact microcontroller: {e}"
                )));
                return Err(e.into());
            }
            debug!("command forwarded");
        }
        None => debug!("offline, command not forwarded"),
    }

    Ok(Json(CommandReply::ok("LEDs updated")))
}

async fn led_state(State(state): State<AppState>) -> Json<LedState> {
    Json(state.store.leds().await)
}

async fn register_device(
    State(state): State<AppState>,
    payload: Result<Json<DeviceRegistration>, JsonRejection>,
) -> Result<Json<CommandReply>, ApiError> {
    let Json(registration) = payload?;
    if [&registration.name, &registration.ip, &registration.kind]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(ApiError::InvalidRequest(
            "name, ip and type must not be empty".into(),
        ));
    }

    let device = state.store.register_device(registration).await;
    info!(name = %device.name, ip = %device.ip, kind = %device.kind, "device registered");

    let message = format!("Device {} registered/updated.", device.name);
    state.publish(PanelEvent::info(message.clone()));
    Ok(Json(CommandReply::ok(message)))
}

async fn list_devices(State(state): State<AppState>) -> Json<Vec<Device>> {
    Json(state.store.devices().await)
}

async fn ingest_sensor_data(
    State(state): State<AppState>,
    payload: Result<Json<SensorReport>, JsonRejection>,
) -> Result<Json<CommandReply>, ApiError> {
    let Json(report) = payload?;
    if report.device.trim().is_empty() {
        return Err(ApiError::InvalidRequest("device must not be empty".into()));
    }

    let stored = state.store.record(&report).await;
    debug!(device = %report.device, stored, "sensor data recorded");
    state.publish(PanelEvent::SensorUpdate(report));

    Ok(Json(CommandReply::ok("Sensor data received and processed.")))
}

#[derive(Debug, Deserialize)]
struct ReadingsQuery {
    limit: Option<usize>,
}

async fn latest_sensor_data(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    query: Result<Query<ReadingsQuery>, QueryRejection>,
) -> Result<Json<Vec<SensorReading>>, ApiError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_READINGS_LIMIT);
    Ok(Json(state.store.latest_readings(&kind, limit).await))
}

/// Server-sent events, starting with the current LED state.
async fn event_stream(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe before reading so no update falls between the two.
    let rx = state.events.subscribe();
    let current = PanelEvent::LedUpdate(state.store.leds().await);
    debug!(panels = state.events.receiver_count(), "panel subscribed");
    events::sse_response(events::subscribe(current, rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceClient;
    use crate::device::tests::{closed_port_url, spawn_fake_device};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use led_shared::{Level, MessageKind};
    use serde::de::DeserializeOwned;
    use std::time::Duration;
    use tower::ServiceExt;

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(state: &AppState, request: Request<Body>) -> axum::response::Response {
        router(state.clone()).oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn control_led_stores_state_and_replies_with_message() {
        let state = AppState::new(None);
        let response = send(&state, post_json("/control-led", r#"{"ledRed":1,"ledGreen":0}"#)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let reply: CommandReply = read_json(response).await;
        assert_eq!(reply.display_text(), Some("LEDs updated"));
        assert_eq!(
            state.store.leds().await,
            LedState::new(Level::On, Level::Off)
        );
    }

    #[tokio::test]
    async fn control_led_broadcasts_update() {
        let state = AppState::new(None);
        let mut rx = state.events.subscribe();

        send(&state, post_json("/control-led", r#"{"ledRed":0,"ledGreen":1}"#)).await;

        assert_eq!(
            rx.try_recv().unwrap(),
            PanelEvent::LedUpdate(LedState::new(Level::Off, Level::On))
        );
    }

    #[tokio::test]
    async fn control_led_rejects_missing_field() {
        let state = AppState::new(None);
        let response = send(&state, post_json("/control-led", r#"{"ledRed":1}"#)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let reply: CommandReply = read_json(response).await;
        assert!(reply.message.is_none());
        assert!(reply.display_text().unwrap().starts_with("invalid request"));
        assert_eq!(state.store.leds().await, LedState::default());
    }

    #[tokio::test]
    async fn control_led_rejects_out_of_range_level() {
        let state = AppState::new(None);
        let response = send(&state, post_json("/control-led", r#"{"ledRed":2,"ledGreen":0}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn control_led_requires_json_content_type() {
        let state = AppState::new(None);
        let request = Request::builder()
            .method("POST")
            .uri("/control-led")
            .body(Body::from(r#"{"ledRed":1,"ledGreen":0}"#))
            .unwrap();
        let response = send(&state, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let reply: CommandReply = read_json(response).await;
        assert!(reply.error.is_some());
    }

    #[tokio::test]
    async fn control_led_forwards_to_device() {
        let (url, mut device_rx) = spawn_fake_device(StatusCode::OK).await;
        let device = DeviceClient::new(&url, Duration::from_secs(2)).unwrap();
        let state = AppState::new(Some(device));

        let response = send(&state, post_json("/control-led", r#"{"ledRed":1,"ledGreen":1}"#)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            device_rx.recv().await,
            Some(LedState::new(Level::On, Level::On))
        );
    }

    #[tokio::test]
    async fn unreachable_device_is_reported_but_state_is_kept() {
        let url = closed_port_url().await;
        let device = DeviceClient::new(&url, Duration::from_secs(2)).unwrap();
        let state = AppState::new(Some(device));
        let mut rx = state.events.subscribe();

        let response = send(&state, post_json("/control-led", r#"{"ledRed":1,"ledGreen":0}"#)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let reply: CommandReply = read_json(response).await;
        assert!(
            reply
                .display_text()
                .unwrap()
                .starts_with("LED state saved but device unreachable")
        );
        assert_eq!(state.store.leds().await.led_red, Level::On);

        assert!(matches!(rx.try_recv().unwrap(), PanelEvent::LedUpdate(_)));
        assert!(matches!(
            rx.try_recv().unwrap(),
            PanelEvent::ServerMessage { kind: MessageKind::Error, .. }
        ));
    }

    #[tokio::test]
    async fn led_state_reflects_last_command() {
        let state = AppState::new(None);
        send(&state, post_json("/control-led", r#"{"ledRed":1,"ledGreen":1}"#)).await;

        let leds: LedState = read_json(send(&state, get("/api/led-state")).await).await;
        assert_eq!(leds, LedState::new(Level::On, Level::On));
    }

    #[tokio::test]
    async fn index_injects_current_state() {
        let state = AppState::new(None);
        state
            .store
            .set_leds_then(LedState::new(Level::Off, Level::On), || ())
            .await;

        let response = send(&state, get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"<script id="led-panel-state" type="application/json">{"ledRed":0,"ledGreen":1}</script>"#));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_commands_agree_on_the_final_state() {
        let (url, mut device_rx) = spawn_fake_device(StatusCode::OK).await;
        let device = DeviceClient::new(&url, Duration::from_secs(2)).unwrap();
        let state = AppState::new(Some(device));
        let mut events = state.events.subscribe();

        let bodies = [
            r#"{"ledRed":1,"ledGreen":0}"#,
            r#"{"ledRed":0,"ledGreen":1}"#,
            r#"{"ledRed":1,"ledGreen":1}"#,
            r#"{"ledRed":0,"ledGreen":0}"#,
        ];
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let state = state.clone();
                let body = bodies[i % bodies.len()];
                tokio::spawn(async move { send(&state, post_json("/control-led", body)).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().status(), StatusCode::OK);
        }

        let stored = state.store.leds().await;

        let mut last_event = None;
        while let Ok(event) = events.try_recv() {
            last_event = Some(event);
        }
        assert_eq!(last_event, Some(PanelEvent::LedUpdate(stored)));

        let mut last_forwarded = None;
        while let Ok(leds) = device_rx.try_recv() {
            last_forwarded = Some(leds);
        }
        assert_eq!(last_forwarded, Some(stored));
    }

    #[tokio::test]
    async fn register_device_then_list() {
        let state = AppState::new(None);
        let mut rx = state.events.subscribe();
        let response = send(
            &state,
            post_json(
                "/api/register-device",
                r#"{"name": "ESP32_Node1", "ip": "192.168.1.100", "type": "ESP32"}"#,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let reply: CommandReply = read_json(response).await;
        assert_eq!(
            reply.display_text(),
            Some("Device ESP32_Node1 registered/updated.")
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            PanelEvent::info("Device ESP32_Node1 registered/updated.")
        );

        let devices: Vec<Device> = read_json(send(&state, get("/api/devices")).await).await;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].kind, "ESP32");
    }

    #[tokio::test]
    async fn register_device_rejects_missing_fields() {
        let state = AppState::new(None);
        let response = send(
            &state,
            post_json("/api/register-device", r#"{"name": "node"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &state,
            post_json(
                "/api/register-device",
                r#"{"name": " ", "ip": "10.0.0.2", "type": "ESP32"}"#,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.devices().await.is_empty());
    }

    #[tokio::test]
    async fn sensor_data_is_stored_and_broadcast() {
        let state = AppState::new(None);
        let mut rx = state.events.subscribe();

        let response = send(
            &state,
            post_json(
                "/api/sensor",
                r#"{"device": "ESP32", "sensors": [{"type": "light", "value": 23.7}, {"type": "light", "value": 24.1}]}"#,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(matches!(rx.try_recv().unwrap(), PanelEvent::SensorUpdate(_)));

        let readings: Vec<SensorReading> =
            read_json(send(&state, get("/api/sensors/light?limit=1")).await).await;
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].value, 24.1);
        assert_eq!(readings[0].device, "ESP32");
    }

    #[tokio::test]
    async fn sensor_sample_without_value_is_rejected() {
        let state = AppState::new(None);
        let response = send(
            &state,
            post_json(
                "/api/sensor",
                r#"{"device": "ESP32", "sensors": [{"type": "light"}]}"#,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let readings: Vec<SensorReading> =
            read_json(send(&state, get("/api/sensors/light")).await).await;
        assert!(readings.is_empty());
    }

    #[tokio::test]
    async fn malformed_limit_is_a_json_error() {
        let state = AppState::new(None);
        let response = send(&state, get("/api/sensors/light?limit=abc")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let reply: CommandReply = read_json(response).await;
        assert!(reply.message.is_none());
        assert!(reply.display_text().unwrap().starts_with("invalid request"));
    }

    #[tokio::test]
    async fn event_stream_starts_with_current_state() {
        let state = AppState::new(None);
        state
            .store
            .set_leds_then(LedState::new(Level::On, Level::Off), || ())
            .await;

        let response = send(&state, get("/api/events")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let frame = response.into_body().frame().await.unwrap().unwrap();
        let chunk = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
        assert_eq!(
            chunk,
            "data: {\"event\":\"led_update\",\"data\":{\"ledRed\":1,\"ledGreen\":0}}\n\n"
        );
    }
}
