//! LED panel frontend.
//!
//! Without features this crate is just the toggle logic, which keeps it
//! testable natively. The `hydrate` feature adds the egui app and the WASM
//! entry point.

pub mod controller;

#[cfg(feature = "hydrate")]
mod api;
#[cfg(feature = "hydrate")]
mod app;

pub use controller::{Dispatch, ToggleController, UNKNOWN_RESPONSE};

#[cfg(feature = "hydrate")]
pub use app::PanelApp;

// ============================================================================
// WASM Entry Point
// ============================================================================

#[cfg(feature = "hydrate")]
mod web {
    use crate::PanelApp;
    use led_shared::LedState;
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(start)]
    pub fn main() {
        eframe::WebLogger::init(log::LevelFilter::Debug).ok();

        wasm_bindgen_futures::spawn_local(async {
            let document = web_sys::window()
                .expect("No window")
                .document()
                .expect("No document");

            let initial: LedState = led_panel::read_initial_state(&document).unwrap_or_else(|| {
                log::warn!("no initial LED state in page, starting with both off");
                LedState::default()
            });

            let canvas = document
                .get_element_by_id("the_canvas_id")
                .expect("Failed to find canvas")
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .expect("Not a canvas element");

            let start_result = eframe::WebRunner::new()
                .start(
                    canvas,
                    eframe::WebOptions::default(),
                    Box::new(move |cc| Ok(Box::new(PanelApp::new(cc, initial)))),
                )
                .await;

            if let Some(loading_text) = document.get_element_by_id("loading_text") {
                match start_result {
                    Ok(_) => loading_text.remove(),
                    Err(e) => {
                        loading_text.set_inner_html(
                            "<p>The panel has crashed. See the developer console for details.</p>",
                        );
                        panic!("Failed to start eframe: {e:?}");
                    }
                }
            }
        });
    }
}
