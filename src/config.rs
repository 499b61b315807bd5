//! Runtime configuration
//!
//! `GlobeConfig` holds the engine tunables, `AppConfig` the endpoints and event
//! facts. Endpoints can be overridden from the environment (native) or from
//! `window.__globe_*` globals (WASM).

use serde::Deserialize;
use tracing::info;

use crate::core::ResumePolicy;

/// Default API base URL for the participant list
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default landmass topology (world-atlas, 1:110m countries)
pub const DEFAULT_LANDMASS_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";

/// Globe engine tunables
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Initial phi rotation in degrees (-30 faces 30°N)
    pub initial_tilt: f64,
    /// Viewports narrower than this use the larger "mobile" scale
    pub narrow_breakpoint: f64,
    pub narrow_scale_factor: f64,
    pub wide_scale_factor: f64,
    /// Start with autorotation running
    pub autorotate: bool,
    /// Longitude advance per animation frame, degrees
    pub rotation_step: f64,
    /// Pixels of drag per degree of rotation
    pub drag_divisor: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Marker radius = sqrt(weight) * marker_scale
    pub marker_scale: f64,
    pub visible_opacity: f32,
    /// Extra pixels around a marker that still count as a hit
    pub hit_tolerance: f64,
    pub resume_policy: ResumePolicy,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            initial_tilt: -30.0,
            narrow_breakpoint: 640.0,
            narrow_scale_factor: 0.5,
            wide_scale_factor: 0.4,
            autorotate: true,
            rotation_step: 0.0375,
            drag_divisor: 4.0,
            min_zoom: 1.0,
            max_zoom: 2.5,
            marker_scale: 3.0,
            visible_opacity: 0.7,
            hit_tolerance: 2.0,
            resume_policy: ResumePolicy::Never,
        }
    }
}

/// Application-level configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub landmass_url: String,
    /// Name of the geometry collection inside the topology
    pub landmass_object: String,
    pub total_seats: u32,
    /// Event start, unix seconds (2025-01-25T00:00:00Z)
    pub launch_unix: i64,
    pub globe: GlobeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            landmass_url: DEFAULT_LANDMASS_URL.to_string(),
            landmass_object: "countries".to_string(),
            total_seats: 120,
            launch_unix: 1_737_763_200,
            globe: GlobeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Users endpoint derived from the API base URL
    pub fn users_url(&self) -> String {
        format!("{}/api/chat/users", self.api_url.trim_end_matches('/'))
    }

    /// Defaults plus environment overrides (HACKER_GLOBE_API_URL, HACKER_GLOBE_LANDMASS_URL)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("HACKER_GLOBE_API_URL") {
            config.api_url = url;
        }
        if let Ok(url) = std::env::var("HACKER_GLOBE_LANDMASS_URL") {
            config.landmass_url = url;
        }
        info!(api_url = %config.api_url, landmass_url = %config.landmass_url, "Configuration resolved");
        config
    }

    /// Defaults plus `window.__globe_api_url` / `window.__globe_landmass_url`
    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        let read = |name: &str| {
            js_sys::eval(&format!("window.{}", name))
                .ok()
                .and_then(|v| v.as_string())
        };
        let mut config = Self::default();
        if let Some(url) = read("__globe_api_url") {
            config.api_url = url;
        }
        if let Some(url) = read("__globe_landmass_url") {
            config.landmass_url = url;
        }
        info!(api_url = %config.api_url, landmass_url = %config.landmass_url, "Configuration resolved");
        config
    }
}
