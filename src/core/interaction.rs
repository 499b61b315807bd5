//! Interaction controller: drag to rotate, wheel/pinch to zoom
//!
//! Reducer-style: `apply(state, input)` returns the replacement state (if
//! any) plus drag lifecycle flags. The caller owns the projection state and
//! decides what a drag start means for autorotation.

use tracing::trace;

use super::projection::{ProjectionState, Rotation, ScreenPos};
use crate::config::GlobeConfig;

/// Same wheel factor as d3-zoom for pixel-mode wheel events
const WHEEL_FACTOR: f64 = 0.002;

/// Inclusive scale range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl ScaleBounds {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }

    pub fn contains(&self, scale: f64) -> bool {
        (self.min..=self.max).contains(&scale)
    }
}

/// Pointer and gesture input, in screen pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Down(ScreenPos),
    Move(ScreenPos),
    Up,
    Leave,
    /// Wheel delta in pixels, positive zooms in
    Wheel(f64),
    /// Multiplicative pinch ratio (> 1 zooms in)
    Pinch(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractionMode {
    Idle,
    Dragging { last: ScreenPos },
}

/// Result of applying one input
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionOutcome {
    /// Replacement projection state, when the input changed it
    pub state: Option<ProjectionState>,
    pub drag_started: bool,
    pub drag_ended: bool,
}

#[derive(Clone, Debug)]
pub struct InteractionController {
    mode: InteractionMode,
    drag_divisor: f64,
    base_scale: f64,
    /// Continuous zoom factor, scale = base_scale * zoom
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl InteractionController {
    /// `base_scale` is the scale derived at mount time
    pub fn new(base_scale: f64, config: &GlobeConfig) -> Self {
        let min_zoom = config.min_zoom.min(config.max_zoom);
        let max_zoom = config.max_zoom.max(config.min_zoom);
        Self {
            mode: InteractionMode::Idle,
            drag_divisor: config.drag_divisor.max(f64::EPSILON),
            base_scale,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, InteractionMode::Dragging { .. })
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn bounds(&self) -> ScaleBounds {
        ScaleBounds {
            min: self.base_scale * self.min_zoom,
            max: self.base_scale * self.max_zoom,
        }
    }

    /// Scale for the initial zoom factor
    pub fn initial_scale(&self) -> f64 {
        self.bounds().clamp(self.base_scale)
    }

    /// Forget zoom and drag state (used by "reset view")
    pub fn reset(&mut self) {
        self.mode = InteractionMode::Idle;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn apply(&mut self, state: &ProjectionState, input: PointerInput) -> InteractionOutcome {
        match (self.mode, input) {
            (InteractionMode::Idle, PointerInput::Down(pos)) => {
                self.mode = InteractionMode::Dragging { last: pos };
                InteractionOutcome { drag_started: true, ..Default::default() }
            }
            (InteractionMode::Dragging { .. }, PointerInput::Down(pos)) => {
                // second button or missed release: restart from here
                self.mode = InteractionMode::Dragging { last: pos };
                InteractionOutcome::default()
            }
            (InteractionMode::Dragging { last }, PointerInput::Move(pos)) => {
                if !pos.is_finite() {
                    return InteractionOutcome::default();
                }
                self.mode = InteractionMode::Dragging { last: pos };
                let (dx, dy) = (pos.x - last.x, pos.y - last.y);
                if dx == 0.0 && dy == 0.0 {
                    return InteractionOutcome::default();
                }
                let r = state.rotation;
                let rotation = Rotation::new(
                    r.lambda + dx / self.drag_divisor,
                    (r.phi - dy / self.drag_divisor).clamp(-90.0, 90.0),
                    r.gamma,
                );
                trace!(dx, dy, lambda = rotation.lambda, phi = rotation.phi, "Drag rotate");
                InteractionOutcome {
                    state: Some(state.with_rotation(rotation)),
                    ..Default::default()
                }
            }
            (InteractionMode::Dragging { .. }, PointerInput::Up | PointerInput::Leave) => {
                self.mode = InteractionMode::Idle;
                InteractionOutcome { drag_ended: true, ..Default::default() }
            }
            (_, PointerInput::Wheel(delta)) => self.zoom_by(state, (2.0_f64).powf(delta * WHEEL_FACTOR)),
            (_, PointerInput::Pinch(ratio)) => self.zoom_by(state, ratio),
            _ => InteractionOutcome::default(),
        }
    }

    fn zoom_by(&mut self, state: &ProjectionState, factor: f64) -> InteractionOutcome {
        if !factor.is_finite() || factor <= 0.0 {
            return InteractionOutcome::default();
        }
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        let scale = self.bounds().clamp(self.base_scale * self.zoom);
        if scale == state.scale {
            return InteractionOutcome::default();
        }
        trace!(zoom = self.zoom, scale, "Zoom");
        InteractionOutcome {
            state: Some(state.with_scale(scale)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (InteractionController, ProjectionState) {
        let config = GlobeConfig::default();
        let state = ProjectionState::new(Rotation::IDENTITY, 300.0, ScreenPos::new(400.0, 300.0));
        (InteractionController::new(300.0, &config), state)
    }

    #[test]
    fn test_down_starts_drag() {
        let (mut ctl, state) = setup();
        let out = ctl.apply(&state, PointerInput::Down(ScreenPos::new(10.0, 10.0)));
        assert!(out.drag_started);
        assert!(out.state.is_none());
        assert!(ctl.is_dragging());
    }

    #[test]
    fn test_drag_direction() {
        let (mut ctl, state) = setup();
        ctl.apply(&state, PointerInput::Down(ScreenPos::new(100.0, 100.0)));
        // 40px right and 20px down at 4px per degree
        let out = ctl.apply(&state, PointerInput::Move(ScreenPos::new(140.0, 120.0)));
        let next = out.state.unwrap();
        assert!((next.rotation.lambda - 10.0).abs() < 1e-12);
        assert!((next.rotation.phi - -5.0).abs() < 1e-12);
        assert_eq!(next.scale, state.scale);
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let (mut ctl, state) = setup();
        let out = ctl.apply(&state, PointerInput::Move(ScreenPos::new(50.0, 50.0)));
        assert_eq!(out, InteractionOutcome::default());
    }

    #[test]
    fn test_up_and_leave_end_drag() {
        for end in [PointerInput::Up, PointerInput::Leave] {
            let (mut ctl, state) = setup();
            ctl.apply(&state, PointerInput::Down(ScreenPos::new(0.0, 0.0)));
            let out = ctl.apply(&state, end);
            assert!(out.drag_ended);
            assert_eq!(ctl.mode(), InteractionMode::Idle);
        }
    }

    #[test]
    fn test_latitude_clamped_at_poles() {
        let (mut ctl, mut state) = setup();
        ctl.apply(&state, PointerInput::Down(ScreenPos::new(0.0, 0.0)));
        let out = ctl.apply(&state, PointerInput::Move(ScreenPos::new(0.0, -10_000.0)));
        state = out.state.unwrap();
        assert_eq!(state.rotation.phi, 90.0);
    }

    #[test]
    fn test_scale_always_within_bounds() {
        let (mut ctl, mut state) = setup();
        let bounds = ctl.bounds();
        let mut seed = 0x2545F4914F6CDD1Du64;
        for _ in 0..5_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let unit = (seed >> 11) as f64 / (1u64 << 53) as f64;
            let input = match seed % 4 {
                0 => PointerInput::Wheel((unit - 0.5) * 20_000.0),
                1 => PointerInput::Pinch(unit * 8.0),
                2 => PointerInput::Pinch(1.0 / (unit + 1e-3)),
                _ => PointerInput::Wheel((unit - 0.5) * 50.0),
            };
            if let Some(next) = ctl.apply(&state, input).state {
                state = next;
            }
            assert!(bounds.contains(state.scale), "scale {} escaped {:?}", state.scale, bounds);
        }
    }

    #[test]
    fn test_zoom_clamps_without_rejecting() {
        let (mut ctl, state) = setup();
        let out = ctl.apply(&state, PointerInput::Pinch(100.0));
        let zoomed = out.state.unwrap();
        assert_eq!(zoomed.scale, 750.0);
        // further zoom-in at the bound is absorbed
        let out = ctl.apply(&zoomed, PointerInput::Pinch(2.0));
        assert!(out.state.is_none());
        // zooming back out responds immediately
        let out = ctl.apply(&zoomed, PointerInput::Pinch(0.5));
        assert_eq!(out.state.unwrap().scale, 375.0);
    }

    #[test]
    fn test_invalid_gestures_ignored() {
        let (mut ctl, state) = setup();
        for input in [
            PointerInput::Pinch(0.0),
            PointerInput::Pinch(-2.0),
            PointerInput::Pinch(f64::NAN),
            PointerInput::Wheel(f64::INFINITY),
        ] {
            assert!(ctl.apply(&state, input).state.is_none());
        }
        assert_eq!(ctl.zoom(), 1.0);
    }
}
