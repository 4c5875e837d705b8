//! led-panel: serve an egui control panel from axum and talk back to it.
//!
//! Server side (`server` feature):
//!
//! - [`Page<T, A>`] renders the embedded `index.html` with `T` injected as the
//!   panel's initial state
//! - [`static_handler`] serves the rest of the embedded bundle
//! - [`events`] turns broadcast channels into server-sent event responses
//!
//! Client side (`client` feature, WASM):
//!
//! - [`read_initial_state`] reads the injected state back out of the DOM
//! - [`rpc::post_json`] posts JSON and decodes the JSON reply
//! - [`events::EventStream`] subscribes to a server-sent event endpoint
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use rust_embed::RustEmbed;
//!
//! #[derive(RustEmbed)]
//! #[folder = "$LED_FRONTEND_DIST"]
//! struct Assets;
//!
//! async fn index() -> led_panel::Page<led_shared::LedState, Assets> {
//!     led_panel::Page::new(led_shared::LedState::default())
//! }
//!
//! let app: Router = Router::new()
//!     .route("/", get(index))
//!     .fallback(led_panel::static_handler::<Assets>);
//! ```

pub mod events;
pub mod rpc;

/// Id of the `<script>` element carrying the initial state.
pub const STATE_ELEMENT_ID: &str = "led-panel-state";

/// Marker in `index.html` replaced by the initial state script.
pub const STATE_PLACEHOLDER: &str = "<!--LED_PANEL_INITIAL_STATE-->";

// ============================================================================
// Server-only: page wrapper and static file serving
// ============================================================================

#[cfg(feature = "server")]
mod server {
    use super::{STATE_ELEMENT_ID, STATE_PLACEHOLDER};
    use axum::{
        http::{StatusCode, Uri, header},
        response::{Html, IntoResponse, Response},
    };
    use rust_embed::RustEmbed;
    use serde::Serialize;
    use std::marker::PhantomData;

    /// Axum response that serves the panel page with `state` injected.
    ///
    /// The state is serialized to JSON and placed in a
    /// `<script type="application/json">` element so the frontend can start
    /// from the server's view instead of a default.
    pub struct Page<T, A: RustEmbed> {
        state: T,
        _assets: PhantomData<A>,
    }

    impl<T, A: RustEmbed> Page<T, A> {
        pub fn new(state: T) -> Self {
            Self {
                state,
                _assets: PhantomData,
            }
        }
    }

    /// Render `html` with the state script in place of the placeholder.
    pub fn inject_state<T: Serialize>(html: &str, state: &T) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(state)?;
        let script = format!(
            r#"<script id="{STATE_ELEMENT_ID}" type="application/json">{}</script>"#,
            json.replace("</", "<\\/")
        );
        Ok(html.replace(STATE_PLACEHOLDER, &script))
    }

    impl<T: Serialize, A: RustEmbed> IntoResponse for Page<T, A> {
        fn into_response(self) -> Response {
            let Some(content) = A::get("index.html") else {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Frontend assets not found. Was the panel bundle built?",
                )
                    .into_response();
            };

            let template = String::from_utf8_lossy(&content.data);
            match inject_state(&template, &self.state) {
                Ok(html) => Html(html).into_response(),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to serialize panel state: {e}"),
                )
                    .into_response(),
            }
        }
    }

    /// Serve a file from the embedded bundle, falling back to `index.html`.
    pub async fn static_handler<A: RustEmbed>(uri: Uri) -> Response {
        let path = uri.path().trim_start_matches('/');

        if let Some(content) = A::get(path) {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            return (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response();
        }

        match A::get("index.html") {
            Some(content) => (
                [(header::CONTENT_TYPE, "text/html".to_string())],
                content.data.into_owned(),
            )
                .into_response(),
            None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
        }
    }
}

#[cfg(feature = "server")]
pub use server::{Page, inject_state, static_handler};

// ============================================================================
// Client-only: initial state hydration
// ============================================================================

/// Read the state injected by [`Page`] from the current document.
///
/// Returns `None` when the element is missing or does not parse, so callers
/// can fall back to a default.
#[cfg(feature = "client")]
pub fn read_initial_state<T: serde::de::DeserializeOwned>(
    document: &web_sys::Document,
) -> Option<T> {
    let script = document.get_element_by_id(STATE_ELEMENT_ID)?;
    let json = script.text_content()?;
    serde_json::from_str(&json).ok()
}
