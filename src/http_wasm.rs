//! WASM HTTP client for the users API and the landmass topology

use crate::core::{LandmassSlot, LandmassSource, LandmassState, SharedLandmass};
use crate::fetch_state::{FetchError, FetchState};
use gloo_net::http::Request;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};
use wasm_bindgen_futures::spawn_local;

/// Shared result slot - fetch future fills it, app takes it in update()
pub type ResultBuffer = Rc<RefCell<Option<Result<String, FetchError>>>>;

/// Called after a fetch completes (e.g. to request a repaint)
pub type Notify = Rc<dyn Fn()>;

/// GET `url` and return the body as text
pub async fn get_text(url: &str) -> Result<String, FetchError> {
    info!(url, "Fetching");
    let response = Request::get(url).send().await.map_err(|e| FetchError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !response.ok() {
        return Err(FetchError::Status { url: url.to_string(), status: response.status() });
    }

    let body = response.text().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    debug!(url, bytes = body.len(), "Fetched");
    Ok(body)
}

fn spawn_fetch<F>(url: &str, on_done: F)
where
    F: FnOnce(Result<String, FetchError>) + 'static,
{
    let url = url.to_string();
    spawn_local(async move {
        let result = get_text(&url).await;
        if let Err(e) = &result {
            warn!(error = %e, "Fetch failed");
        }
        on_done(result);
    });
}

/// One-shot fetch whose result is buffered for the app to pick up
pub struct WasmFetch {
    pub buffer: ResultBuffer,
    pub state: Rc<RefCell<FetchState>>,
}

impl WasmFetch {
    pub fn get(url: &str, notify: Option<Notify>) -> Self {
        let buffer: ResultBuffer = Rc::new(RefCell::new(None));
        let state = Rc::new(RefCell::new(FetchState::Loading));

        let buffer_clone = buffer.clone();
        let fetch_state = state.clone();
        spawn_fetch(url, move |result| {
            *fetch_state.borrow_mut() = FetchState::from_result(&result);
            *buffer_clone.borrow_mut() = Some(result);
            if let Some(notify) = notify {
                notify();
            }
        });

        Self { buffer, state }
    }

    /// Take the result once it has arrived
    pub fn take(&self) -> Option<Result<String, FetchError>> {
        self.buffer.borrow_mut().take()
    }
}

/// Fetches the landmass topology for every mounted scene
pub struct WasmLandmassSource {
    url: String,
    shared: SharedLandmass,
    pub state: Rc<RefCell<FetchState>>,
    notify: Option<Notify>,
}

impl WasmLandmassSource {
    pub fn new(url: &str, object: &str, notify: Option<Notify>) -> Self {
        Self {
            url: url.to_string(),
            shared: SharedLandmass::new(object),
            state: Rc::new(RefCell::new(FetchState::Idle)),
            notify,
        }
    }
}

impl LandmassSource for WasmLandmassSource {
    fn request(&self, slot: LandmassSlot) {
        if !self.shared.attach(slot) {
            return;
        }
        *self.state.borrow_mut() = FetchState::Loading;

        let shared = self.shared.clone();
        let state = self.state.clone();
        let notify = self.notify.clone();
        spawn_fetch(&self.url, move |result| {
            let (landmass, delivered) = shared.complete(result.map_err(|e| e.to_string()));
            *state.borrow_mut() = match landmass {
                LandmassState::Failed(reason) => FetchState::Failed(reason),
                _ => FetchState::Loaded,
            };
            if delivered > 0 {
                if let Some(notify) = notify {
                    notify();
                }
            }
        });
    }
}
