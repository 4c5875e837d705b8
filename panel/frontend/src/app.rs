//! The egui panel.

use crate::api;
use crate::controller::{Dispatch, ToggleController};
use futures_util::StreamExt;
use led_panel::events::EventStream;
use led_panel::rpc::ClientError;
use led_shared::{
    CommandReply, EVENTS_PATH, LedId, LedState, Level, MessageKind, PanelEvent, SensorReport,
};
use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, Sender, channel};

/// Messages from spawned futures back to the UI thread.
enum Incoming {
    Reply {
        seq: u64,
        outcome: Result<CommandReply, ClientError>,
    },
    Event(PanelEvent),
}

struct LatestSample {
    device: String,
    value: f64,
}

pub struct PanelApp {
    controller: ToggleController,
    notice: Option<(MessageKind, String)>,
    sensors: BTreeMap<String, LatestSample>,
    incoming_rx: Receiver<Incoming>,
    incoming_tx: Sender<Incoming>,
}

impl PanelApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial: LedState) -> Self {
        let (tx, rx) = channel();
        listen_for_events(cc.egui_ctx.clone(), tx.clone());
        Self {
            controller: ToggleController::new(initial),
            notice: None,
            sensors: BTreeMap::new(),
            incoming_rx: rx,
            incoming_tx: tx,
        }
    }

    fn toggle(&mut self, ctx: &egui::Context, id: LedId) {
        let Dispatch { seq, command } = self.controller.handle_toggle(id);
        let tx = self.incoming_tx.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = api::send_command(command).await;
            let _ = tx.send(Incoming::Reply { seq, outcome });
            ctx.request_repaint();
        });
    }

    fn process_incoming(&mut self) {
        while let Ok(incoming) = self.incoming_rx.try_recv() {
            match incoming {
                Incoming::Reply { seq, outcome } => {
                    self.controller.apply_reply(seq, outcome);
                }
                Incoming::Event(PanelEvent::LedUpdate(state)) => self.controller.sync(state),
                Incoming::Event(PanelEvent::SensorUpdate(report)) => self.record(report),
                Incoming::Event(PanelEvent::ServerMessage { kind, text }) => {
                    self.notice = Some((kind, text));
                }
            }
        }
    }

    fn record(&mut self, report: SensorReport) {
        for sample in report.sensors {
            self.sensors.insert(
                sample.kind,
                LatestSample {
                    device: report.device.clone(),
                    value: sample.value,
                },
            );
        }
    }
}

fn led_color(id: LedId, level: Level) -> egui::Color32 {
    match (id, level) {
        (_, Level::Off) => egui::Color32::from_gray(60),
        (LedId::Red, Level::On) => egui::Color32::from_rgb(200, 40, 40),
        (LedId::Green, Level::On) => egui::Color32::from_rgb(40, 160, 60),
    }
}

/// Forward server-sent events into the UI channel for the life of the page.
fn listen_for_events(ctx: egui::Context, tx: Sender<Incoming>) {
    wasm_bindgen_futures::spawn_local(async move {
        let mut events = match EventStream::<PanelEvent>::connect(EVENTS_PATH) {
            Ok(events) => events,
            Err(e) => {
                log::warn!("live updates unavailable: {e}");
                return;
            }
        };

        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    log::debug!("received {}", event.name());
                    if tx.send(Incoming::Event(event)).is_err() {
                        break;
                    }
                    ctx.request_repaint();
                }
                Err(e) => log::warn!("{e}"),
            }
        }
    });
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_incoming();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("LED control");

            ui.horizontal(|ui| {
                for id in LedId::ALL {
                    let button = egui::Button::new(self.controller.label(id))
                        .fill(led_color(id, self.controller.level(id)))
                        .min_size(egui::vec2(96.0, 32.0));
                    if ui.add(button).clicked() {
                        self.toggle(ctx, id);
                    }
                }
            });

            ui.horizontal(|ui| {
                ui.label("Status:");
                ui.monospace(self.controller.status().unwrap_or_default());
            });

            if let Some((kind, text)) = &self.notice {
                let color = match kind {
                    MessageKind::Error => egui::Color32::LIGHT_RED,
                    MessageKind::Info => ui.visuals().text_color(),
                };
                ui.colored_label(color, text);
            }

            if !self.sensors.is_empty() {
                ui.separator();
                ui.label("Sensors");
                egui::Grid::new("sensors").striped(true).show(ui, |ui| {
                    for (kind, sample) in &self.sensors {
                        ui.label(kind);
                        ui.monospace(format!("{:.2}", sample.value));
                        ui.label(&sample.device);
                        ui.end_row();
                    }
                });
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                egui::warn_if_debug_build(ui);
            });
        });
    }
}
