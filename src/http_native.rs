//! Native HTTP client for the users API and the landmass topology
//!
//! Uses reqwest in a background thread hosting a tokio runtime, with
//! channel-based result passing.

use crate::core::{LandmassSlot, LandmassSource, LandmassState, SharedLandmass};
use crate::fetch_state::{FetchError, FetchState};
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Called after a background fetch completes (e.g. to request a repaint)
pub type Notify = Arc<dyn Fn() + Send + Sync>;

/// GET `url` and return the body as text
pub async fn get_text(url: &str) -> Result<String, FetchError> {
    info!(url, "Fetching");
    let response = reqwest::get(url).await.map_err(|e| FetchError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
    }

    let body = response.text().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    debug!(url, bytes = body.len(), "Fetched");
    Ok(body)
}

/// Run `get_text` on a background thread and hand the result to `on_done`
fn spawn_fetch<F>(url: &str, on_done: F)
where
    F: FnOnce(Result<String, FetchError>) + Send + 'static,
{
    let url = url.to_string();
    std::thread::spawn(move || {
        let result = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(get_text(&url)),
            Err(e) => {
                error!(error = %e, "Failed to create tokio runtime");
                Err(FetchError::Transport { url, reason: e.to_string() })
            }
        };
        if let Err(e) = &result {
            warn!(error = %e, "Fetch failed");
        }
        on_done(result);
    });
}

/// One-shot fetch whose result arrives on a channel
pub struct NativeFetch {
    /// Receiver for the response body
    pub rx: Receiver<Result<String, FetchError>>,
    /// Shared fetch state
    pub state: Arc<Mutex<FetchState>>,
}

impl NativeFetch {
    pub fn get(url: &str, notify: Option<Notify>) -> Self {
        let (tx, rx): (Sender<Result<String, FetchError>>, Receiver<_>) = mpsc::channel();
        let state = Arc::new(Mutex::new(FetchState::Loading));

        let fetch_state = state.clone();
        spawn_fetch(url, move |result| {
            *fetch_state.lock() = FetchState::from_result(&result);
            // Receiver dropped means nobody is waiting any more
            if tx.send(result).is_ok() {
                if let Some(notify) = notify {
                    notify();
                }
            }
        });

        Self { rx, state }
    }
}

/// Fetches the landmass topology for every mounted scene
pub struct NativeLandmassSource {
    url: String,
    shared: SharedLandmass,
    pub state: Arc<Mutex<FetchState>>,
    notify: Option<Notify>,
}

impl NativeLandmassSource {
    pub fn new(url: &str, object: &str, notify: Option<Notify>) -> Self {
        Self {
            url: url.to_string(),
            shared: SharedLandmass::new(object),
            state: Arc::new(Mutex::new(FetchState::Idle)),
            notify,
        }
    }
}

impl LandmassSource for NativeLandmassSource {
    fn request(&self, slot: LandmassSlot) {
        if !self.shared.attach(slot) {
            return;
        }
        *self.state.lock() = FetchState::Loading;

        let shared = self.shared.clone();
        let state = self.state.clone();
        let notify = self.notify.clone();
        spawn_fetch(&self.url, move |result| {
            let (landmass, delivered) = shared.complete(result.map_err(|e| e.to_string()));
            *state.lock() = match landmass {
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
