//! Orthographic projection engine
//!
//! `ProjectionState` is an immutable value: every mutation returns a new state,
//! so a redraw step can be replayed or tested without a rendering surface.
//! Rotation follows the d3 `rotate([lambda, phi, gamma])` convention.

use std::f64::consts::FRAC_PI_2;

use super::geo::{geo_distance, wrap_longitude, GeoPoint};
use crate::config::GlobeConfig;

/// Tolerance that makes the 90° horizon inclusive despite rounding
pub const HORIZON_EPSILON: f64 = 1e-9;

/// Euler rotation in degrees
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rotation {
    pub lambda: f64,
    pub phi: f64,
    pub gamma: f64,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation { lambda: 0.0, phi: 0.0, gamma: 0.0 };

    pub const fn new(lambda: f64, phi: f64, gamma: f64) -> Self {
        Self { lambda, phi, gamma }
    }

    /// Rotation that brings `point` to the centre of the disc
    pub fn facing(point: GeoPoint) -> Self {
        Self::new(-point.longitude, -point.latitude, 0.0)
    }
}

/// Screen-space position in pixels (y grows downwards)
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
}

impl ScreenPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: ScreenPos) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A point on the unit sphere in view space.
///
/// `x`/`y` span the screen plane (y up), `depth` points at the viewer:
/// a point is on the visible hemisphere iff `depth >= 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewVector {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl ViewVector {
    /// Point where the great-circle segment `self -> other` crosses the horizon.
    ///
    /// Expects the two depths to have opposite signs.
    pub fn horizon_crossing(self, other: ViewVector) -> Option<ViewVector> {
        let denom = self.depth - other.depth;
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = self.depth / denom;
        let x = self.x + (other.x - self.x) * t;
        let y = self.y + (other.y - self.y) * t;
        let norm = x.hypot(y);
        if norm < 1e-12 {
            return None;
        }
        Some(ViewVector { x: x / norm, y: y / norm, depth: 0.0 })
    }
}

/// Full projection state: rotation, scale and translation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionState {
    pub rotation: Rotation,
    /// Sphere radius in pixels
    pub scale: f64,
    /// Screen position of the sphere centre
    pub translate: ScreenPos,
}

impl ProjectionState {
    pub fn new(rotation: Rotation, scale: f64, translate: ScreenPos) -> Self {
        Self { rotation, scale, translate }
    }

    /// Derive the initial state for a viewport.
    ///
    /// Scale is a function of the smaller viewport dimension; narrow viewports
    /// get a larger globe shifted upwards.
    pub fn fit(width: f64, height: f64, config: &GlobeConfig) -> Self {
        let narrow = width < config.narrow_breakpoint;
        let factor = if narrow {
            config.narrow_scale_factor
        } else {
            config.wide_scale_factor
        };
        let scale = width.min(height) * factor;
        let translate = if narrow {
            ScreenPos::new(width / 2.0, height * 0.4)
        } else {
            ScreenPos::new(width / 2.0, height / 2.0)
        };
        Self::new(Rotation::new(0.0, config.initial_tilt, 0.0), scale, translate)
    }

    pub fn with_rotation(self, rotation: Rotation) -> Self {
        Self { rotation, ..self }
    }

    /// Replace the scale. No validation; callers clamp.
    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// Geographic point currently at the centre of the disc
    pub fn facing_point(&self) -> GeoPoint {
        GeoPoint::new(wrap_longitude(-self.rotation.lambda), -self.rotation.phi)
    }

    /// Rotate a geographic point into view space
    pub fn view_vector(&self, point: GeoPoint) -> ViewVector {
        let lambda = (point.longitude + self.rotation.lambda).to_radians();
        let phi = point.latitude.to_radians();
        let (sin_dphi, cos_dphi) = self.rotation.phi.to_radians().sin_cos();
        let (sin_dgamma, cos_dgamma) = self.rotation.gamma.to_radians().sin_cos();

        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();

        // phi about the y axis, then gamma about the x axis
        let x1 = x * cos_dphi - z * sin_dphi;
        let z1 = z * cos_dphi + x * sin_dphi;
        let y2 = y * cos_dgamma - z1 * sin_dgamma;
        let z2 = z1 * cos_dgamma + y * sin_dgamma;

        ViewVector { x: y2, y: z2, depth: x1 }
    }

    /// Map a view-space vector onto the screen
    pub fn view_to_screen(&self, v: ViewVector) -> ScreenPos {
        ScreenPos::new(
            self.translate.x + self.scale * v.x,
            self.translate.y - self.scale * v.y,
        )
    }

    /// Project a point. Back-side points still project (onto the disc);
    /// `None` only when the result is not finite.
    pub fn project(&self, point: GeoPoint) -> Option<ScreenPos> {
        let pos = self.view_to_screen(self.view_vector(point));
        pos.is_finite().then_some(pos)
    }

    /// Visible iff the great-circle distance from the facing point is <= 90°
    pub fn is_visible(&self, point: GeoPoint) -> bool {
        geo_distance(self.facing_point(), point) <= FRAC_PI_2 + HORIZON_EPSILON
    }
}
