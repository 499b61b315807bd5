//! Mounted globe scene and its owning container
//!
//! `GlobeScene` is the handle for one mounted visualization: it owns the
//! projection state, the interaction controller, the autorotation driver and
//! the landmass slot. `GlobeContainer` owns sizing and selection dispatch and
//! replaces the scene whenever the viewport changes.

use std::sync::Arc;

use tracing::{debug, info};

use super::autorotate::AutorotationDriver;
use super::geo::GeoPoint;
use super::interaction::{InteractionController, PointerInput};
use super::landmass::{LandmassSlot, LandmassSource, LandmassState};
use super::nodes::{NodeId, NodeList};
use super::projection::{ProjectionState, Rotation, ScreenPos};
use super::scene::{layout, SceneFrame};
use super::selection::{NodeSelected, SelectListener, SelectionDispatch};
use super::topology::Landmass;
use crate::config::GlobeConfig;

pub struct GlobeScene<P> {
    width: f64,
    height: f64,
    config: GlobeConfig,
    state: ProjectionState,
    controller: InteractionController,
    driver: AutorotationDriver,
    landmass: LandmassSlot,
    /// Landmass the current frame was laid out with
    laid_out_land: Option<Arc<Landmass>>,
    nodes: NodeList<P>,
    frame: SceneFrame,
    dragging: bool,
    /// Last timestamp seen from the shell, seconds
    clock: f64,
    torn_down: bool,
}

impl<P> GlobeScene<P> {
    /// Derive the projection for `width` x `height`, request the landmass
    /// and lay out the first frame.
    pub fn mount(
        width: f64,
        height: f64,
        config: &GlobeConfig,
        nodes: NodeList<P>,
        source: &dyn LandmassSource,
    ) -> Self {
        let state = ProjectionState::fit(width, height, config);
        let controller = InteractionController::new(state.scale, config);
        let state = state.with_scale(controller.initial_scale());
        let driver = AutorotationDriver::new(config.autorotate, config.rotation_step, config.resume_policy);

        let landmass = LandmassSlot::new();
        source.request(landmass.clone());

        let frame = layout(&state, &nodes, None, config);
        info!(width, height, scale = state.scale, nodes = nodes.len(), "Globe scene mounted");

        let mut scene = Self {
            width,
            height,
            config: config.clone(),
            state,
            controller,
            driver,
            landmass,
            laid_out_land: None,
            nodes,
            frame,
            dragging: false,
            clock: 0.0,
            torn_down: false,
        };
        // a synchronous source may already have delivered
        scene.update_visibility();
        scene
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn state(&self) -> &ProjectionState {
        &self.state
    }

    pub fn frame(&self) -> &SceneFrame {
        &self.frame
    }

    pub fn nodes(&self) -> &NodeList<P> {
        &self.nodes
    }

    pub fn landmass_state(&self) -> LandmassState {
        self.landmass.state()
    }

    pub fn is_rotating(&self) -> bool {
        self.driver.is_running()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn zoom(&self) -> f64 {
        self.controller.zoom()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Whether the shell must keep requesting frames
    pub fn wants_frame(&self) -> bool {
        !self.torn_down && self.driver.wants_frame()
    }

    /// Recompute marker positions, visibility and landmass paths
    pub fn update_visibility(&mut self) {
        if self.torn_down {
            return;
        }
        let land = self.landmass.landmass();
        self.frame = layout(&self.state, &self.nodes, land.as_deref(), &self.config);
        self.laid_out_land = land;
    }

    /// Dragging stops autorotation; releasing does not restart it
    pub fn set_dragging(&mut self, dragging: bool) {
        if dragging {
            self.driver.interrupt(self.clock);
        }
        self.dragging = dragging;
    }

    pub fn stop_rotation(&mut self) {
        self.driver.stop();
    }

    pub fn resume_rotation(&mut self) {
        if !self.torn_down {
            self.driver.resume();
        }
    }

    /// Replace the node list wholesale
    pub fn set_nodes(&mut self, nodes: NodeList<P>) {
        self.nodes = nodes;
        self.update_visibility();
    }

    /// Feed one pointer or gesture event. Returns true if the frame changed.
    pub fn handle(&mut self, input: PointerInput, now: f64) -> bool {
        if self.torn_down {
            return false;
        }
        self.clock = now;
        let outcome = self.controller.apply(&self.state, input);
        if outcome.drag_started {
            self.set_dragging(true);
        }
        if outcome.drag_ended {
            self.set_dragging(false);
            // restart the idle window from the release
            self.driver.interrupt(now);
        }
        if matches!(input, PointerInput::Wheel(_) | PointerInput::Pinch(_)) {
            self.driver.interrupt(now);
        }
        match outcome.state {
            Some(next) => {
                self.state = next;
                self.update_visibility();
                true
            }
            None => false,
        }
    }

    /// One animation frame. Returns true if the frame changed.
    pub fn tick(&mut self, now: f64) -> bool {
        if self.torn_down {
            return false;
        }
        self.clock = now;
        let mut changed = false;
        if let Some(rotation) = self.driver.tick(self.state.rotation, self.dragging, now) {
            self.state = self.state.with_rotation(rotation);
            changed = true;
        }
        let land = self.landmass.landmass();
        let land_changed = match (&land, &self.laid_out_land) {
            (Some(a), Some(b)) => !Arc::ptr_eq(a, b),
            (None, None) => false,
            _ => true,
        };
        if changed || land_changed {
            self.update_visibility();
        }
        changed || land_changed
    }

    /// Rotate so `point` faces the viewer and stop autorotation
    pub fn focus(&mut self, point: GeoPoint) {
        if self.torn_down {
            return;
        }
        self.driver.stop();
        let rotation = Rotation { gamma: self.state.rotation.gamma, ..Rotation::facing(point) };
        debug!(lon = point.longitude, lat = point.latitude, "Focus");
        self.state = self.state.with_rotation(rotation);
        self.update_visibility();
    }

    /// Focus the node with `id`; false if it is not in the current list
    pub fn focus_node(&mut self, id: NodeId) -> bool {
        match self.nodes.find(id).map(|(_, node)| node.position) {
            Some(position) => {
                self.focus(position);
                true
            }
            None => false,
        }
    }

    /// Back to the mount-time rotation and zoom
    pub fn reset_view(&mut self) {
        if self.torn_down {
            return;
        }
        self.controller.reset();
        self.dragging = false;
        let fitted = ProjectionState::fit(self.width, self.height, &self.config);
        self.state = fitted.with_scale(self.controller.initial_scale());
        self.update_visibility();
    }

    /// Stop the animation and detach the landmass slot. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.driver.stop();
        self.landmass.teardown();
        self.dragging = false;
        self.torn_down = true;
        debug!(width = self.width, height = self.height, "Globe scene torn down");
    }

    /// Tear down, keeping what a remount carries over: the nodes and the
    /// autorotation driver with its interaction history
    fn into_parts(mut self) -> (NodeList<P>, AutorotationDriver) {
        let driver = self.driver.clone();
        self.teardown();
        (std::mem::take(&mut self.nodes), driver)
    }
}

impl<P: Clone> GlobeScene<P> {
    /// Resolve a click to the topmost visible marker
    pub fn click(&mut self, pos: ScreenPos) -> Option<NodeSelected<P>> {
        if self.torn_down {
            return None;
        }
        let hit = self.frame.hit_test(pos, self.config.hit_tolerance)?;
        let (index, node) = self.nodes.find(hit.id)?;
        Some(NodeSelected {
            id: node.id,
            index,
            category: node.category,
            payload: node.payload.clone(),
        })
    }
}

impl<P> Drop for GlobeScene<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Owns the mounted scene, its sizing and the selection listener
pub struct GlobeContainer<P> {
    config: GlobeConfig,
    source: Box<dyn LandmassSource>,
    scene: Option<GlobeScene<P>>,
    /// Nodes waiting for the first mount
    pending: NodeList<P>,
    autorotate: bool,
    selection: SelectionDispatch<P>,
}

impl<P> GlobeContainer<P> {
    pub fn new(config: GlobeConfig, source: Box<dyn LandmassSource>) -> Self {
        Self {
            autorotate: config.autorotate,
            config,
            source,
            scene: None,
            pending: NodeList::default(),
            selection: SelectionDispatch::default(),
        }
    }

    pub fn scene(&self) -> Option<&GlobeScene<P>> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut GlobeScene<P>> {
        self.scene.as_mut()
    }

    pub fn frame(&self) -> Option<&SceneFrame> {
        self.scene.as_ref().map(GlobeScene::frame)
    }

    pub fn nodes(&self) -> &NodeList<P> {
        self.scene.as_ref().map(GlobeScene::nodes).unwrap_or(&self.pending)
    }

    /// Re-derive the projection for a new viewport.
    ///
    /// The old scene is torn down and a new one mounted, which also requests
    /// the landmass again. A rotation stopped by interaction stays stopped.
    /// Same size or a degenerate viewport is a no-op.
    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return;
        }
        if self.scene.as_ref().is_some_and(|s| s.size() == (width, height)) {
            return;
        }
        let (nodes, driver) = match self.scene.take() {
            Some(old) => {
                let (nodes, driver) = old.into_parts();
                (nodes, Some(driver))
            }
            None => (std::mem::take(&mut self.pending), None),
        };
        let config = GlobeConfig { autorotate: self.autorotate, ..self.config.clone() };
        let mut scene = GlobeScene::mount(width, height, &config, nodes, self.source.as_ref());
        if let Some(driver) = driver {
            scene.driver = driver;
        }
        self.scene = Some(scene);
    }

    pub fn set_nodes(&mut self, nodes: NodeList<P>) {
        match self.scene.as_mut() {
            Some(scene) => scene.set_nodes(nodes),
            None => self.pending = nodes,
        }
    }

    /// Register the selection listener, replacing any previous one
    pub fn on_select(&mut self, listener: SelectListener<P>) {
        self.selection.set(listener);
    }

    /// Autorotation preference; also applied to scenes mounted later
    pub fn set_autorotate(&mut self, enabled: bool) {
        self.autorotate = enabled;
        if let Some(scene) = self.scene.as_mut() {
            if enabled {
                scene.resume_rotation();
            } else {
                scene.stop_rotation();
            }
        }
    }

    pub fn handle(&mut self, input: PointerInput, now: f64) -> bool {
        self.scene.as_mut().is_some_and(|s| s.handle(input, now))
    }

    pub fn tick(&mut self, now: f64) -> bool {
        self.scene.as_mut().is_some_and(|s| s.tick(now))
    }

    pub fn focus(&mut self, point: GeoPoint) {
        if let Some(scene) = self.scene.as_mut() {
            scene.focus(point);
        }
    }

    pub fn stop_rotation(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.stop_rotation();
        }
    }

    pub fn reset_view(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.reset_view();
        }
    }

    pub fn teardown(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.teardown();
        }
    }
}

impl<P: Clone> GlobeContainer<P> {
    /// Hit-test a click and notify the listener.
    ///
    /// Returns the selection so callers without a listener can use it too.
    pub fn click(&mut self, pos: ScreenPos) -> Option<NodeSelected<P>> {
        let selected = self.scene.as_mut()?.click(pos)?;
        debug!(id = selected.id.0, index = selected.index, "Node selected");
        self.selection.dispatch(&selected);
        Some(selected)
    }
}
