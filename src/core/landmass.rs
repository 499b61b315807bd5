//! Landmass overlay: one-shot fetch result guarded by a liveness flag
//!
//! A scene hands a `LandmassSlot` to a `LandmassSource` when it mounts. The
//! source may complete on another thread long after the scene is gone, so
//! `deliver` and `teardown` share one lock: once torn down, the slot drops
//! every completion.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::topology::{decode_topology, Landmass};

#[derive(Clone, Debug, PartialEq)]
pub enum LandmassState {
    Pending,
    Loaded(Arc<Landmass>),
    Failed(String),
}

struct SlotInner {
    alive: bool,
    state: LandmassState,
}

/// Shared handle between a mounted scene and its in-flight fetch
#[derive(Clone)]
pub struct LandmassSlot {
    inner: Arc<Mutex<SlotInner>>,
}

impl Default for LandmassSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmassSlot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotInner {
                alive: true,
                state: LandmassState::Pending,
            })),
        }
    }

    /// Store a fetch result. Returns false if the scene was already torn down.
    pub fn deliver(&self, result: Result<Landmass, String>) -> bool {
        self.deliver_shared(result.map(Arc::new))
    }

    /// Same as `deliver`, for a landmass shared between scenes
    pub fn deliver_shared(&self, result: Result<Arc<Landmass>, String>) -> bool {
        let mut inner = self.inner.lock();
        if !inner.alive {
            debug!("Landmass completion after teardown ignored");
            return false;
        }
        inner.state = match result {
            Ok(landmass) => LandmassState::Loaded(landmass),
            Err(reason) => {
                warn!(%reason, "Landmass unavailable, rendering without it");
                LandmassState::Failed(reason)
            }
        };
        true
    }

    /// Decode a raw topology body and deliver it
    pub fn deliver_topology(&self, body: &str, object: &str) -> bool {
        self.deliver(decode_topology(body, object).map_err(|e| e.to_string()))
    }

    pub fn teardown(&self) {
        let mut inner = self.inner.lock();
        inner.alive = false;
        inner.state = LandmassState::Pending;
    }

    pub fn is_alive(&self) -> bool {
        self.inner.lock().alive
    }

    pub fn state(&self) -> LandmassState {
        self.inner.lock().state.clone()
    }

    /// Loaded landmass, if any
    pub fn landmass(&self) -> Option<Arc<Landmass>> {
        match &self.inner.lock().state {
            LandmassState::Loaded(landmass) => Some(Arc::clone(landmass)),
            _ => None,
        }
    }
}

struct SharedInner {
    loaded: Option<Arc<Landmass>>,
    waiting: Vec<LandmassSlot>,
    in_flight: bool,
}

/// One landmass download shared by every scene mounted while it runs.
///
/// Remounts attach to the download in flight instead of starting another,
/// and once it has loaded they get the decoded landmass straight away. A
/// failed download is not cached, so the next mount tries again.
#[derive(Clone)]
pub struct SharedLandmass {
    object: String,
    inner: Arc<Mutex<SharedInner>>,
}

impl SharedLandmass {
    pub fn new(object: &str) -> Self {
        Self {
            object: object.to_string(),
            inner: Arc::new(Mutex::new(SharedInner {
                loaded: None,
                waiting: Vec::new(),
                in_flight: false,
            })),
        }
    }

    /// Fill `slot` from the cache or queue it on the download.
    ///
    /// Returns true when the caller has to start the download.
    pub fn attach(&self, slot: LandmassSlot) -> bool {
        let mut inner = self.inner.lock();
        if let Some(landmass) = &inner.loaded {
            slot.deliver_shared(Ok(Arc::clone(landmass)));
            return false;
        }
        inner.waiting.retain(LandmassSlot::is_alive);
        inner.waiting.push(slot);
        !std::mem::replace(&mut inner.in_flight, true)
    }

    /// Finish the download and deliver to every queued slot still alive.
    ///
    /// Returns the resulting state and how many scenes received it.
    pub fn complete(&self, body: Result<String, String>) -> (LandmassState, usize) {
        let result = body.and_then(|body| {
            decode_topology(&body, &self.object)
                .map(Arc::new)
                .map_err(|e| e.to_string())
        });
        let mut inner = self.inner.lock();
        inner.in_flight = false;
        let waiting = std::mem::take(&mut inner.waiting);
        let delivered = waiting
            .iter()
            .filter(|slot| slot.deliver_shared(result.clone()))
            .count();
        debug!(delivered, queued = waiting.len(), "Landmass download finished");
        match result {
            Ok(landmass) => {
                inner.loaded = Some(Arc::clone(&landmass));
                (LandmassState::Loaded(landmass), delivered)
            }
            Err(reason) => (LandmassState::Failed(reason), delivered),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.lock().in_flight
    }
}

/// Something that can fill a slot, usually with an HTTP fetch
pub trait LandmassSource {
    /// Start loading. Implementations call `slot.deliver*` when done.
    fn request(&self, slot: LandmassSlot);
}

/// Source that never loads anything (headless tests, offline mode)
pub struct NoLandmass;

impl LandmassSource for NoLandmass {
    fn request(&self, _slot: LandmassSlot) {}
}

/// Source backed by a topology body fetched ahead of time (CLI)
pub struct PrefetchedTopology {
    pub body: Result<String, String>,
    pub object: String,
}

impl LandmassSource for PrefetchedTopology {
    fn request(&self, slot: LandmassSlot) {
        match &self.body {
            Ok(body) => slot.deliver_topology(body, &self.object),
            Err(reason) => slot.deliver(Err(reason.clone())),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "type": "Topology",
        "objects": {"countries": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "arcs": [[0]]}
        ]}},
        "arcs": [[[0, 0], [10, 0], [10, 10], [0, 0]]]
    }"#;

    #[test]
    fn test_delivery_loads() {
        let slot = LandmassSlot::new();
        assert_eq!(slot.state(), LandmassState::Pending);
        assert!(slot.deliver_topology(SQUARE, "countries"));
        assert_eq!(slot.landmass().map(|l| l.ring_count()), Some(1));
    }

    #[test]
    fn test_delivery_after_teardown_is_ignored() {
        let slot = LandmassSlot::new();
        let in_flight = slot.clone();
        slot.teardown();
        assert!(!in_flight.deliver_topology(SQUARE, "countries"));
        assert_eq!(slot.state(), LandmassState::Pending);
        assert!(slot.landmass().is_none());
    }

    #[test]
    fn test_teardown_from_another_thread() {
        let slot = LandmassSlot::new();
        let worker = slot.clone();
        slot.teardown();
        let handle = std::thread::spawn(move || worker.deliver(Ok(Landmass::default())));
        assert!(!handle.join().unwrap());
        assert!(!slot.is_alive());
    }

    #[test]
    fn test_failed_fetch_is_recorded() {
        let slot = LandmassSlot::new();
        assert!(slot.deliver(Err("HTTP 503".into())));
        assert_eq!(slot.state(), LandmassState::Failed("HTTP 503".into()));
        assert!(slot.landmass().is_none());
    }

    #[test]
    fn test_prefetched_source_delivers_immediately() {
        let source = PrefetchedTopology { body: Ok(SQUARE.to_string()), object: "countries".into() };
        let slot = LandmassSlot::new();
        source.request(slot.clone());
        assert!(slot.landmass().is_some());

        let source = PrefetchedTopology { body: Err("offline".into()), object: "countries".into() };
        let slot = LandmassSlot::new();
        source.request(slot.clone());
        assert_eq!(slot.state(), LandmassState::Failed("offline".into()));
    }

    #[test]
    fn test_remounts_share_one_download() {
        let shared = SharedLandmass::new("countries");
        let first = LandmassSlot::new();
        let second = LandmassSlot::new();
        let third = LandmassSlot::new();
        assert!(shared.attach(first.clone()));
        assert!(!shared.attach(second.clone()));
        assert!(!shared.attach(third.clone()));
        assert!(shared.is_in_flight());

        // first two scenes were replaced before the body arrived
        first.teardown();
        second.teardown();
        let (state, delivered) = shared.complete(Ok(SQUARE.to_string()));
        assert!(matches!(state, LandmassState::Loaded(_)));
        assert_eq!(delivered, 1);
        assert_eq!(first.state(), LandmassState::Pending);
        assert!(third.landmass().is_some());

        // later mounts are served from the cache without a download
        let fourth = LandmassSlot::new();
        assert!(!shared.attach(fourth.clone()));
        assert!(Arc::ptr_eq(&fourth.landmass().unwrap(), &third.landmass().unwrap()));
    }

    #[test]
    fn test_failed_download_is_retried() {
        let shared = SharedLandmass::new("countries");
        let slot = LandmassSlot::new();
        assert!(shared.attach(slot.clone()));
        let (state, delivered) = shared.complete(Err("HTTP 503".into()));
        assert_eq!(state, LandmassState::Failed("HTTP 503".into()));
        assert_eq!(delivered, 1);
        assert!(!shared.is_in_flight());
        assert!(shared.attach(LandmassSlot::new()));
    }

    #[test]
    fn test_bad_body_becomes_failure() {
        let slot = LandmassSlot::new();
        slot.deliver_topology("not json", "countries");
        assert!(matches!(slot.state(), LandmassState::Failed(_)));
    }
}
