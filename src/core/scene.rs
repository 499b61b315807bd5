//! Scene layout: projection state + nodes + landmass -> screen primitives
//!
//! Layout is a pure function and runs in full on every state change. The
//! renderer only paints what `SceneFrame` holds.

use std::f64::consts::{PI, TAU};

use earcutr::earcut;
use tracing::trace;

use super::geo::GeoPoint;
use super::nodes::{MarkerCategory, NodeId, NodeList};
use super::projection::{ProjectionState, ScreenPos, ViewVector};
use super::topology::Landmass;
use crate::config::GlobeConfig;

/// Radius offsets of the cosmetic glow discs behind the sphere, in pixels
pub const GLOW_OFFSETS: [f64; 3] = [10.0, 20.0, 30.0];

/// Angular spacing of the points that close a clipped land area along the limb
const LIMB_STEP: f64 = 5.0 * PI / 180.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereLayout {
    pub center: ScreenPos,
    pub radius: f64,
    /// Outer radii of the glow discs, innermost first
    pub glow_radii: [f64; 3],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerLayout {
    pub id: NodeId,
    /// Position in the node list this frame was laid out from
    pub index: usize,
    pub position: ScreenPos,
    pub radius: f64,
    pub opacity: f32,
    pub visible: bool,
    pub category: MarkerCategory,
    pub is_new: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneFrame {
    pub sphere: SphereLayout,
    /// Landmass outline runs on the visible hemisphere
    pub land: Vec<Vec<ScreenPos>>,
    /// Visible land areas as a flat triangle list, three vertices each
    pub land_fill: Vec<ScreenPos>,
    /// One entry per node, in draw order
    pub markers: Vec<MarkerLayout>,
}

impl SceneFrame {
    pub fn visible_markers(&self) -> impl Iterator<Item = &MarkerLayout> {
        self.markers.iter().filter(|m| m.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_markers().count()
    }

    /// Topmost visible marker under `pos`.
    ///
    /// Markers drawn later sit on top, so the search runs back to front.
    pub fn hit_test(&self, pos: ScreenPos, tolerance: f64) -> Option<&MarkerLayout> {
        self.markers
            .iter()
            .rev()
            .filter(|m| m.visible)
            .find(|m| m.position.distance(pos) <= m.radius + tolerance)
    }
}

/// Lay out one frame
pub fn layout<P>(
    state: &ProjectionState,
    nodes: &NodeList<P>,
    landmass: Option<&Landmass>,
    config: &GlobeConfig,
) -> SceneFrame {
    let sphere = SphereLayout {
        center: state.translate,
        radius: state.scale,
        glow_radii: GLOW_OFFSETS.map(|offset| state.scale + offset),
    };

    let mut land = Vec::new();
    let mut land_fill = Vec::new();
    if let Some(landmass) = landmass {
        for ring in landmass.countries.iter().flat_map(|country| country.rings.iter()) {
            land.extend(clip_ring(state, ring));
            fill_ring(state, ring, &mut land_fill);
        }
    }

    let markers = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let projected = state.project(node.position);
            let visible = projected.is_some() && state.is_visible(node.position);
            MarkerLayout {
                id: node.id,
                index,
                position: projected.unwrap_or(state.translate),
                radius: node.weight.sqrt() * config.marker_scale,
                opacity: if visible { config.visible_opacity } else { 0.0 },
                visible,
                category: node.category,
                is_new: node.is_new,
            }
        })
        .collect();

    SceneFrame { sphere, land, land_fill, markers }
}

/// Split a ring into screen polylines on the front hemisphere.
///
/// Segments that cross the horizon are cut where they meet the limb.
fn clip_ring(state: &ProjectionState, ring: &[GeoPoint]) -> Vec<Vec<ScreenPos>> {
    let mut runs = Vec::new();
    let mut current: Vec<ScreenPos> = Vec::new();
    let mut prev: Option<ViewVector> = None;

    for &point in ring {
        let v = state.view_vector(point);
        let front = v.depth >= 0.0;
        match prev {
            None if front => current.push(state.view_to_screen(v)),
            None => {}
            Some(p) => {
                let was_front = p.depth >= 0.0;
                match (was_front, front) {
                    (true, true) => current.push(state.view_to_screen(v)),
                    (true, false) => {
                        if let Some(edge) = p.horizon_crossing(v) {
                            current.push(state.view_to_screen(edge));
                        }
                        flush(&mut runs, &mut current);
                    }
                    (false, true) => {
                        if let Some(edge) = p.horizon_crossing(v) {
                            current.push(state.view_to_screen(edge));
                        }
                        current.push(state.view_to_screen(v));
                    }
                    (false, false) => {}
                }
            }
        }
        prev = Some(v);
    }
    flush(&mut runs, &mut current);
    runs
}

/// Triangulate the visible part of a ring into `out`.
///
/// Where the ring passes behind the globe, the area is closed along the limb
/// between the exit and the re-entry point, taking the shorter way round.
fn fill_ring(state: &ProjectionState, ring: &[GeoPoint], out: &mut Vec<ScreenPos>) {
    let mut points: Vec<ViewVector> = ring.iter().map(|&p| state.view_vector(p)).collect();
    if points.len() >= 2 && ring.first() == ring.last() {
        points.pop();
    }
    if points.len() < 3 {
        return;
    }
    // start on the front so every exit is followed by an entry
    let Some(start) = points.iter().position(|v| v.depth >= 0.0) else {
        return;
    };
    points.rotate_left(start);

    let mut polygon: Vec<ScreenPos> = Vec::with_capacity(points.len());
    let mut exit: Option<ScreenPos> = None;
    for (i, &p) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        let (front, next_front) = (p.depth >= 0.0, next.depth >= 0.0);
        if front {
            polygon.push(state.view_to_screen(p));
        }
        if front == next_front {
            continue;
        }
        let Some(edge) = p.horizon_crossing(next) else {
            continue;
        };
        let edge = state.view_to_screen(edge);
        if front {
            exit = Some(edge);
        } else if let Some(from) = exit.take() {
            limb_arc(state, from, edge, &mut polygon);
        }
        polygon.push(edge);
    }
    triangulate(&polygon, out);
}

/// Points strictly between `from` and `to` along the limb
fn limb_arc(state: &ProjectionState, from: ScreenPos, to: ScreenPos, polygon: &mut Vec<ScreenPos>) {
    let c = state.translate;
    let start = (from.y - c.y).atan2(from.x - c.x);
    let end = (to.y - c.y).atan2(to.x - c.x);
    let sweep = (end - start + PI).rem_euclid(TAU) - PI;
    let steps = (sweep.abs() / LIMB_STEP).ceil() as usize;
    for k in 1..steps {
        let angle = start + sweep * k as f64 / steps as f64;
        polygon.push(ScreenPos::new(
            c.x + state.scale * angle.cos(),
            c.y + state.scale * angle.sin(),
        ));
    }
}

fn triangulate(polygon: &[ScreenPos], out: &mut Vec<ScreenPos>) {
    if polygon.len() < 3 || !polygon.iter().all(|p| p.is_finite()) {
        return;
    }
    let coords: Vec<f64> = polygon.iter().flat_map(|p| [p.x, p.y]).collect();
    match earcut(&coords, &[], 2) {
        Ok(indices) => out.extend(indices.into_iter().filter_map(|i| polygon.get(i).copied())),
        Err(_) => trace!(points = polygon.len(), "Land area not triangulated"),
    }
}

fn flush(runs: &mut Vec<Vec<ScreenPos>>, current: &mut Vec<ScreenPos>) {
    if current.len() >= 2 && current.iter().all(|p| p.is_finite()) {
        runs.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::nodes::MarkerCategory;
    use crate::core::projection::Rotation;
    use crate::core::topology::Country;

    fn state(rotation: Rotation) -> ProjectionState {
        ProjectionState::new(rotation, 100.0, ScreenPos::new(200.0, 200.0))
    }

    fn nodes(points: &[(f64, f64)]) -> NodeList<usize> {
        let mut builder = NodeList::builder();
        for (i, &(lon, lat)) in points.iter().enumerate() {
            builder.push(&i, lon, lat, 4.0, MarkerCategory::User, i);
        }
        builder.build()
    }

    fn square(lon: f64, lat: f64, size: f64) -> Landmass {
        let ring = vec![
            GeoPoint::new(lon, lat),
            GeoPoint::new(lon + size, lat),
            GeoPoint::new(lon + size, lat + size),
            GeoPoint::new(lon, lat + size),
            GeoPoint::new(lon, lat),
        ];
        Landmass { countries: vec![Country { name: None, rings: vec![ring] }] }
    }

    #[test]
    fn test_marker_opacity_is_binary() {
        let config = GlobeConfig::default();
        let list = nodes(&[(0.0, 0.0), (180.0, 0.0)]);
        let frame = layout(&state(Rotation::IDENTITY), &list, None, &config);
        assert_eq!(frame.markers[0].opacity, 0.7);
        assert!(frame.markers[0].visible);
        assert_eq!(frame.markers[1].opacity, 0.0);
        assert!(!frame.markers[1].visible);
        // sqrt(4) * 3
        assert_eq!(frame.markers[0].radius, 6.0);
        assert_eq!(frame.visible_count(), 1);
    }

    #[test]
    fn test_markers_without_landmass() {
        let config = GlobeConfig::default();
        let list = nodes(&[(0.0, 0.0), (10.0, 10.0), (-20.0, 5.0)]);
        let s = state(Rotation::IDENTITY);
        let frame = layout(&s, &list, None, &config);
        assert!(frame.land.is_empty());
        assert_eq!(frame.markers.len(), 3);
        for (marker, node) in frame.markers.iter().zip(list.iter()) {
            assert_eq!(Some(marker.position), s.project(node.position));
        }
    }

    #[test]
    fn test_sphere_and_glow() {
        let config = GlobeConfig::default();
        let frame = layout(&state(Rotation::IDENTITY), &nodes(&[]), None, &config);
        assert_eq!(frame.sphere.radius, 100.0);
        assert_eq!(frame.sphere.glow_radii, [110.0, 120.0, 130.0]);
        assert_eq!(frame.sphere.center, ScreenPos::new(200.0, 200.0));
    }

    #[test]
    fn test_front_ring_kept_whole() {
        let config = GlobeConfig::default();
        let land = square(-10.0, -10.0, 20.0);
        let frame = layout(&state(Rotation::IDENTITY), &nodes(&[]), Some(&land), &config);
        assert_eq!(frame.land.len(), 1);
        assert_eq!(frame.land[0].len(), 5);
    }

    #[test]
    fn test_back_ring_dropped() {
        let config = GlobeConfig::default();
        let land = square(170.0, -10.0, 5.0);
        let frame = layout(&state(Rotation::IDENTITY), &nodes(&[]), Some(&land), &config);
        assert!(frame.land.is_empty());
    }

    #[test]
    fn test_ring_across_horizon_is_cut_at_limb() {
        let config = GlobeConfig::default();
        let land = square(60.0, -10.0, 60.0);
        let s = state(Rotation::IDENTITY);
        let frame = layout(&s, &nodes(&[]), Some(&land), &config);
        assert!(!frame.land.is_empty());
        for run in &frame.land {
            for p in run {
                // nothing lands outside the disc
                assert!(p.distance(s.translate) <= s.scale + 1e-6);
            }
        }
        let on_limb = frame
            .land
            .iter()
            .flatten()
            .filter(|p| (p.distance(s.translate) - s.scale).abs() < 1e-6)
            .count();
        assert_eq!(on_limb, 2);
    }

    fn triangle_area(t: &[ScreenPos]) -> f64 {
        ((t[1].x - t[0].x) * (t[2].y - t[0].y) - (t[2].x - t[0].x) * (t[1].y - t[0].y)).abs() / 2.0
    }

    #[test]
    fn test_front_land_is_filled() {
        let config = GlobeConfig::default();
        let land = square(-10.0, -10.0, 20.0);
        let s = state(Rotation::IDENTITY);
        let frame = layout(&s, &nodes(&[]), Some(&land), &config);
        assert_eq!(frame.land_fill.len(), 6);

        // the two triangles cover the projected quad
        let quad = &frame.land[0];
        let shoelace = quad
            .windows(2)
            .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
            .sum::<f64>()
            .abs()
            / 2.0;
        let filled: f64 = frame.land_fill.chunks(3).map(triangle_area).sum();
        assert!((filled - shoelace).abs() < 1e-6, "{filled} vs {shoelace}");
    }

    #[test]
    fn test_back_land_is_not_filled() {
        let config = GlobeConfig::default();
        let land = square(170.0, -10.0, 5.0);
        let frame = layout(&state(Rotation::IDENTITY), &nodes(&[]), Some(&land), &config);
        assert!(frame.land_fill.is_empty());
    }

    #[test]
    fn test_land_across_horizon_is_closed_on_limb() {
        let config = GlobeConfig::default();
        let land = square(60.0, -10.0, 60.0);
        let s = state(Rotation::IDENTITY);
        let frame = layout(&s, &nodes(&[]), Some(&land), &config);
        assert!(!frame.land_fill.is_empty());
        assert_eq!(frame.land_fill.len() % 3, 0);
        for p in &frame.land_fill {
            assert!(p.distance(s.translate) <= s.scale + 1e-6);
        }
        let filled: f64 = frame.land_fill.chunks(3).map(triangle_area).sum();
        assert!(filled > 0.0);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let config = GlobeConfig::default();
        let list = nodes(&[(0.0, 0.0), (0.5, 0.0), (180.0, 0.0)]);
        let s = state(Rotation::IDENTITY);
        let frame = layout(&s, &list, None, &config);
        let hit = frame.hit_test(s.translate, config.hit_tolerance).unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn test_hit_test_skips_hidden_and_misses() {
        let config = GlobeConfig::default();
        let list = nodes(&[(180.0, 0.0)]);
        let s = state(Rotation::IDENTITY);
        let frame = layout(&s, &list, None, &config);
        // hidden marker collapses onto the disc centre but is not clickable
        assert!(frame.hit_test(frame.markers[0].position, 2.0).is_none());

        let list = nodes(&[(0.0, 0.0)]);
        let frame = layout(&s, &list, None, &config);
        assert!(frame.hit_test(ScreenPos::new(207.9, 200.0), 2.0).is_some());
        assert!(frame.hit_test(ScreenPos::new(208.1, 200.0), 2.0).is_none());
    }
}
