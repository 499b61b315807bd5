//! Hacker globe - interactive orthographic globe of hackathon participants
//!
//! Fetches the participant list and a world landmass topology, and renders:
//! - An auto-rotating globe with drag-to-rotate and wheel/pinch zoom
//! - One marker per participant, hidden on the far side of the sphere
//! - A details window for the selected participant

pub mod config;
pub mod core;
pub mod fetch_state;
pub mod time;

#[cfg(any(feature = "wasm", feature = "native"))]
pub mod app;
#[cfg(any(feature = "wasm", feature = "native"))]
pub mod theme;

#[cfg(all(not(target_arch = "wasm32"), any(feature = "native", feature = "cli")))]
pub mod http_native;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod http_wasm;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
mod web {
    use tracing::error;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::app::GlobeApp;
    use crate::config::AppConfig;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        // Initialize tracing for browser console
        tracing_wasm::set_as_global_default();

        let canvas = web_sys::window()
            .ok_or("no window")?
            .document()
            .ok_or("no document")?
            .get_element_by_id("canvas")
            .ok_or("no canvas element")?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        let web_options = eframe::WebOptions::default();
        let config = AppConfig::from_env();

        wasm_bindgen_futures::spawn_local(async move {
            let started = eframe::WebRunner::new()
                .start(
                    canvas,
                    web_options,
                    Box::new(|cc| Ok(Box::new(GlobeApp::new(cc, config)))),
                )
                .await;
            if let Err(e) = started {
                error!(?e, "Failed to start eframe");
            }
        });
        Ok(())
    }
}
