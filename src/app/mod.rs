//! Hacker globe app
//!
//! This module contains the egui app that runs on both native and WASM platforms.

mod details;
mod globe_view;
mod header;
mod settings;

use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::{
    build_user_nodes, parse_users, GlobeContainer, NodeSelected, SignupStats, UserNode,
};
use crate::fetch_state::{FetchError, FetchState};
use crate::theme::globe_visuals;
use crate::time::unix_seconds;

#[cfg(target_arch = "wasm32")]
use crate::http_wasm::{WasmFetch, WasmLandmassSource};

#[cfg(not(target_arch = "wasm32"))]
use crate::http_native::{NativeFetch, NativeLandmassSource, Notify};
#[cfg(not(target_arch = "wasm32"))]
use parking_lot::Mutex;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;

/// Latest selection, written by the container's listener
pub(crate) type SelectedNode = Rc<RefCell<Option<NodeSelected<UserNode>>>>;

/// Hacker globe app - runs on both native and WASM
pub struct GlobeApp {
    pub(crate) config: AppConfig,
    pub(crate) container: GlobeContainer<UserNode>,
    pub(crate) users: Vec<UserNode>,
    pub(crate) stats: SignupStats,
    pub(crate) selected: SelectedNode,

    /// Users fetch in flight (platform-specific)
    #[cfg(target_arch = "wasm32")]
    users_fetch: Option<WasmFetch>,
    #[cfg(not(target_arch = "wasm32"))]
    users_fetch: Option<NativeFetch>,

    /// Fetch states shown in the UI (platform-specific wrapper)
    #[cfg(target_arch = "wasm32")]
    users_state: Rc<RefCell<FetchState>>,
    #[cfg(not(target_arch = "wasm32"))]
    users_state: Arc<Mutex<FetchState>>,
    #[cfg(target_arch = "wasm32")]
    landmass_state: Rc<RefCell<FetchState>>,
    #[cfg(not(target_arch = "wasm32"))]
    landmass_state: Arc<Mutex<FetchState>>,

    /// FPS counter
    pub(crate) fps_counter: header::FpsCounter,
    /// Show settings sidebar
    pub(crate) show_settings: bool,
}

impl GlobeApp {
    /// Create new app for WASM platform
    #[cfg(target_arch = "wasm32")]
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(globe_visuals());

        let ctx = cc.egui_ctx.clone();
        let notify: crate::http_wasm::Notify = Rc::new(move || ctx.request_repaint());

        let source = WasmLandmassSource::new(
            &config.landmass_url,
            &config.landmass_object,
            Some(notify.clone()),
        );
        let landmass_state = source.state.clone();
        let users_fetch = WasmFetch::get(&config.users_url(), Some(notify));
        let users_state = users_fetch.state.clone();

        Self::with_parts(config, Box::new(source), Some(users_fetch), users_state, landmass_state)
    }

    /// Create new app for native platform
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(globe_visuals());

        let ctx = cc.egui_ctx.clone();
        let notify: Notify = Arc::new(move || ctx.request_repaint());

        let source = NativeLandmassSource::new(
            &config.landmass_url,
            &config.landmass_object,
            Some(notify.clone()),
        );
        let landmass_state = source.state.clone();
        let users_fetch = NativeFetch::get(&config.users_url(), Some(notify));
        let users_state = users_fetch.state.clone();

        Self::with_parts(config, Box::new(source), Some(users_fetch), users_state, landmass_state)
    }

    #[cfg(target_arch = "wasm32")]
    fn with_parts(
        config: AppConfig,
        source: Box<dyn crate::core::LandmassSource>,
        users_fetch: Option<WasmFetch>,
        users_state: Rc<RefCell<FetchState>>,
        landmass_state: Rc<RefCell<FetchState>>,
    ) -> Self {
        let (container, selected) = Self::container(&config, source);
        Self {
            stats: SignupStats::compute(0, config.total_seats, config.launch_unix, unix_seconds()),
            config,
            container,
            users: Vec::new(),
            selected,
            users_fetch,
            users_state,
            landmass_state,
            fps_counter: header::FpsCounter::new(),
            show_settings: false,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn with_parts(
        config: AppConfig,
        source: Box<dyn crate::core::LandmassSource>,
        users_fetch: Option<NativeFetch>,
        users_state: Arc<Mutex<FetchState>>,
        landmass_state: Arc<Mutex<FetchState>>,
    ) -> Self {
        let (container, selected) = Self::container(&config, source);
        Self {
            stats: SignupStats::compute(0, config.total_seats, config.launch_unix, unix_seconds()),
            config,
            container,
            users: Vec::new(),
            selected,
            users_fetch,
            users_state,
            landmass_state,
            fps_counter: header::FpsCounter::new(),
            show_settings: false,
        }
    }

    /// Container with the selection listener wired to the details window
    fn container(
        config: &AppConfig,
        source: Box<dyn crate::core::LandmassSource>,
    ) -> (GlobeContainer<UserNode>, SelectedNode) {
        let mut container = GlobeContainer::new(config.globe.clone(), source);
        let selected: SelectedNode = Rc::new(RefCell::new(None));
        let sink = selected.clone();
        container.on_select(Box::new(move |event: &NodeSelected<UserNode>| {
            *sink.borrow_mut() = Some(event.clone());
        }));
        (container, selected)
    }

    /// Start a new users fetch; the result replaces the node list wholesale
    pub(crate) fn refresh_users(&mut self, ctx: &egui::Context) {
        let url = self.config.users_url();
        #[cfg(target_arch = "wasm32")]
        {
            let ctx = ctx.clone();
            let fetch = WasmFetch::get(&url, Some(Rc::new(move || ctx.request_repaint())));
            self.users_state = fetch.state.clone();
            self.users_fetch = Some(fetch);
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = ctx.clone();
            let fetch = NativeFetch::get(&url, Some(Arc::new(move || ctx.request_repaint())));
            self.users_state = fetch.state.clone();
            self.users_fetch = Some(fetch);
        }
    }

    /// Pick up a finished users fetch (native)
    #[cfg(not(target_arch = "wasm32"))]
    fn poll_users(&mut self) {
        let result = match self.users_fetch.as_ref().map(|f| f.rx.try_recv()) {
            Some(Ok(result)) => result,
            _ => return,
        };
        self.users_fetch = None;
        self.apply_users(result);
    }

    /// Pick up a finished users fetch (WASM)
    #[cfg(target_arch = "wasm32")]
    fn poll_users(&mut self) {
        let result = match self.users_fetch.as_ref().and_then(WasmFetch::take) {
            Some(result) => result,
            None => return,
        };
        self.users_fetch = None;
        self.apply_users(result);
    }

    fn apply_users(&mut self, result: Result<String, FetchError>) {
        self.users = match result {
            Ok(body) => parse_users(&body),
            Err(e) => {
                warn!(error = %e, "Users unavailable, showing an empty globe");
                Vec::new()
            }
        };
        let nodes = build_user_nodes(&self.users, self.container.nodes());
        info!(users = self.users.len(), markers = nodes.len(), "Users loaded");
        self.container.set_nodes(nodes);
        self.stats = SignupStats::compute(
            self.users.len(),
            self.config.total_seats,
            self.config.launch_unix,
            unix_seconds(),
        );
    }

    /// Get the current users fetch state
    pub(crate) fn users_state(&self) -> FetchState {
        #[cfg(target_arch = "wasm32")]
        {
            self.users_state.borrow().clone()
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.users_state.lock().clone()
        }
    }

    /// Get the current landmass fetch state
    pub(crate) fn landmass_state(&self) -> FetchState {
        #[cfg(target_arch = "wasm32")]
        {
            self.landmass_state.borrow().clone()
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.landmass_state.lock().clone()
        }
    }
}

impl eframe::App for GlobeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_users();

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(crate::theme::colors::BG_PRIMARY).inner_margin(4.0))
            .show(ctx, |ui| {
                self.render_header(ui);
            });

        // Settings sidebar (left, must be shown before CentralPanel)
        if self.show_settings {
            self.render_settings(ctx);
        }

        self.render_details(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(crate::theme::colors::BG_PRIMARY))
            .show(ctx, |ui| {
                self.render_globe(ui);
            });
    }
}
