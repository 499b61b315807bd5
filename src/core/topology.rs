//! TopoJSON decoding into landmass rings
//!
//! Supports quantized (delta-encoded) and plain arcs, reversed arc indices,
//! and Polygon / MultiPolygon / GeometryCollection objects. Other geometry
//! types are ignored; the landmass layer only needs outlines.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::geo::GeoPoint;

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("invalid topology JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("topology has no object named {0:?}")]
    MissingObject(String),
    #[error("arc index {index} out of range ({count} arcs)")]
    ArcOutOfRange { index: i64, count: usize },
}

#[derive(Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    objects: HashMap<String, Value>,
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Deserialize, Clone, Copy)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    GeometryCollection {
        geometries: Vec<Member>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Option<Value>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Option<Value>,
    },
    #[serde(other)]
    Unsupported,
}

/// Collection member; null or malformed geometries are skipped
#[derive(Deserialize)]
#[serde(untagged)]
enum Member {
    Geometry(Geometry),
    Other(serde::de::IgnoredAny),
}

/// One country (or other feature) outline
#[derive(Clone, Debug, PartialEq)]
pub struct Country {
    pub name: Option<String>,
    /// Closed rings; first and last point coincide
    pub rings: Vec<Vec<GeoPoint>>,
}

/// Decoded landmass layer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Landmass {
    pub countries: Vec<Country>,
}

impl Landmass {
    pub fn ring_count(&self) -> usize {
        self.countries.iter().map(|c| c.rings.len()).sum()
    }

    pub fn point_count(&self) -> usize {
        self.countries
            .iter()
            .flat_map(|c| c.rings.iter())
            .map(|r| r.len())
            .sum()
    }
}

/// Decode the geometry collection `object` of a TopoJSON document
pub fn decode_topology(json: &str, object: &str) -> Result<Landmass, TopologyError> {
    let topology: Topology = serde_json::from_str(json)?;
    let arcs = decode_arcs(&topology.arcs, topology.transform);
    let root = topology
        .objects
        .get(object)
        .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;
    let root = Geometry::deserialize(root)?;

    let mut landmass = Landmass::default();
    collect_geometry(&root, &arcs, &mut landmass)?;
    debug!(
        countries = landmass.countries.len(),
        rings = landmass.ring_count(),
        points = landmass.point_count(),
        "Topology decoded"
    );
    Ok(landmass)
}

/// Absolute coordinates for every arc
fn decode_arcs(raw: &[Vec<Vec<f64>>], transform: Option<Transform>) -> Vec<Vec<GeoPoint>> {
    raw.iter()
        .map(|arc| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .filter(|position| position.len() >= 2)
                .map(|position| match transform {
                    Some(t) => {
                        x += position[0];
                        y += position[1];
                        GeoPoint::new(x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                    }
                    None => GeoPoint::new(position[0], position[1]),
                })
                .collect()
        })
        .collect()
}

fn collect_geometry(
    geometry: &Geometry,
    arcs: &[Vec<GeoPoint>],
    out: &mut Landmass,
) -> Result<(), TopologyError> {
    match geometry {
        Geometry::GeometryCollection { geometries } => {
            for member in geometries {
                match member {
                    Member::Geometry(child) => collect_geometry(child, arcs, out)?,
                    Member::Other(_) => trace!("Skipping null geometry"),
                }
            }
        }
        Geometry::Polygon { arcs: rings, properties } => {
            let rings = rings
                .iter()
                .map(|ring| stitch_ring(ring, arcs))
                .collect::<Result<Vec<_>, _>>()?;
            out.countries.push(Country { name: feature_name(properties), rings });
        }
        Geometry::MultiPolygon { arcs: polygons, properties } => {
            let mut rings = Vec::new();
            for polygon in polygons {
                for ring in polygon {
                    rings.push(stitch_ring(ring, arcs)?);
                }
            }
            out.countries.push(Country { name: feature_name(properties), rings });
        }
        Geometry::Unsupported => trace!("Skipping unsupported geometry"),
    }
    Ok(())
}

fn feature_name(properties: &Option<Value>) -> Option<String> {
    properties
        .as_ref()
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Concatenate arcs into one ring. A negative index `i` means arc `!i`
/// traversed backwards; the shared point between consecutive arcs is kept once.
fn stitch_ring(indices: &[i64], arcs: &[Vec<GeoPoint>]) -> Result<Vec<GeoPoint>, TopologyError> {
    let mut ring: Vec<GeoPoint> = Vec::new();
    for &index in indices {
        let (arc_index, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(arc_index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(TopologyError::ArcOutOfRange { index, count: arcs.len() })?;

        let skip = usize::from(!ring.is_empty());
        if reversed {
            ring.extend(arc.iter().rev().skip(skip).copied());
        } else {
            ring.extend(arc.iter().skip(skip).copied());
        }
    }
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two squares sharing the edge x=1; the second polygon walks arc 1 backwards.
    const QUANTIZED: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [1.0, 1.0], "translate": [10.0, 20.0]},
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1]], "id": "001", "properties": {"name": "Westland"}},
                    {"type": "MultiPolygon", "arcs": [[[2, -2]]], "properties": {"name": "Eastland"}},
                    {"type": "Point", "coordinates": [0, 0]},
                    {"type": null}
                ]
            }
        },
        "arcs": [
            [[1, 0], [-1, 0], [0, 1], [1, 0]],
            [[1, 1], [0, -1]],
            [[1, 1], [1, 0], [0, -1], [-1, 0]]
        ]
    }"#;

    #[test]
    fn test_decode_quantized_collection() {
        let landmass = decode_topology(QUANTIZED, "countries").unwrap();
        assert_eq!(landmass.countries.len(), 2);

        let west = &landmass.countries[0];
        assert_eq!(west.name.as_deref(), Some("Westland"));
        let ring = &west.rings[0];
        // arc 0 (4 points) + arc 1 without its shared first point
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], GeoPoint::new(11.0, 20.0));
        assert_eq!(ring[1], GeoPoint::new(10.0, 20.0));
        assert_eq!(ring[3], GeoPoint::new(11.0, 21.0));
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_reversed_arc_index() {
        let landmass = decode_topology(QUANTIZED, "countries").unwrap();
        let east = &landmass.countries[1];
        assert_eq!(east.name.as_deref(), Some("Eastland"));
        let ring = &east.rings[0];
        // arc 2 ends at (11,20); arc 1 reversed runs (11,20) -> (11,21)
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[3], GeoPoint::new(11.0, 20.0));
        assert_eq!(ring[4], GeoPoint::new(11.0, 21.0));
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_plain_arcs_without_transform() {
        let json = r#"{
            "type": "Topology",
            "objects": {"land": {"type": "Polygon", "arcs": [[0]]}},
            "arcs": [[[-10.5, 5.0], [10.5, 5.0], [0.0, -5.0], [-10.5, 5.0]]]
        }"#;
        let landmass = decode_topology(json, "land").unwrap();
        let ring = &landmass.countries[0].rings[0];
        assert_eq!(ring[1], GeoPoint::new(10.5, 5.0));
        assert_eq!(landmass.countries[0].name, None);
    }

    #[test]
    fn test_missing_object() {
        let err = decode_topology(QUANTIZED, "land").unwrap_err();
        assert!(matches!(err, TopologyError::MissingObject(ref name) if name == "land"));
    }

    #[test]
    fn test_arc_out_of_range() {
        let json = r#"{
            "type": "Topology",
            "objects": {"land": {"type": "Polygon", "arcs": [[3]]}},
            "arcs": [[[0, 0], [1, 1]]]
        }"#;
        let err = decode_topology(json, "land").unwrap_err();
        assert!(matches!(err, TopologyError::ArcOutOfRange { index: 3, count: 1 }));
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(
            decode_topology("<html>503</html>", "countries"),
            Err(TopologyError::Json(_))
        ));
    }
}
