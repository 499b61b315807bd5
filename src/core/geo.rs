//! Geographic points and great-circle math
//!
//! All angles at the API boundary are degrees; radians stay internal.

use serde::{Deserialize, Serialize};

/// A real-world location in degrees.
///
/// Longitude is expected in [-180, 180] and latitude in [-90, 90]. The
/// projection does not validate; use [`GeoPoint::sanitized`] when ingesting
/// data from outside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Normalise a point for ingestion.
    ///
    /// Non-finite input is rejected. Longitude wraps into [-180, 180],
    /// latitude is clamped to [-90, 90].
    pub fn sanitized(longitude: f64, latitude: f64) -> Option<Self> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return None;
        }
        Some(Self {
            longitude: wrap_longitude(longitude),
            latitude: latitude.clamp(-90.0, 90.0),
        })
    }

    pub fn in_range(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }

    /// Unit vector on the sphere (x towards lon 0 / lat 0, z towards north pole).
    pub fn to_unit_vector(self) -> [f64; 3] {
        let (lambda, phi) = (self.longitude.to_radians(), self.latitude.to_radians());
        let cos_phi = phi.cos();
        [cos_phi * lambda.cos(), cos_phi * lambda.sin(), phi.sin()]
    }

    pub fn from_unit_vector(v: [f64; 3]) -> Self {
        let [x, y, z] = v;
        Self {
            longitude: y.atan2(x).to_degrees(),
            latitude: z.clamp(-1.0, 1.0).asin().to_degrees(),
        }
    }
}

/// Wrap a longitude in degrees into [-180, 180].
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps 180 to -180; keep the caller's sign at the antimeridian
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Great-circle angular distance between two points, in radians.
///
/// Uses the atan2 form, which stays accurate near 0 and near pi.
pub fn geo_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lambda0, phi0) = (a.longitude.to_radians(), a.latitude.to_radians());
    let (lambda1, phi1) = (b.longitude.to_radians(), b.latitude.to_radians());

    let delta = (lambda1 - lambda0).abs();
    let (sin_delta, cos_delta) = delta.sin_cos();
    let (sin_phi0, cos_phi0) = phi0.sin_cos();
    let (sin_phi1, cos_phi1) = phi1.sin_cos();

    let x = cos_phi1 * sin_delta;
    let y = cos_phi0 * sin_phi1 - sin_phi0 * cos_phi1 * cos_delta;
    let z = sin_phi0 * sin_phi1 + cos_phi0 * cos_phi1 * cos_delta;

    (x * x + y * y).sqrt().atan2(z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(13.4, 52.5);
        assert!(geo_distance(p, p).abs() < EPS);
    }

    #[test]
    fn distance_quarter_and_half_turn() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((geo_distance(origin, GeoPoint::new(90.0, 0.0)) - FRAC_PI_2).abs() < EPS);
        assert!((geo_distance(origin, GeoPoint::new(0.0, 90.0)) - FRAC_PI_2).abs() < EPS);
        assert!((geo_distance(origin, GeoPoint::new(180.0, 0.0)) - PI).abs() < EPS);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(-93.265, 44.9778);
        let b = GeoPoint::new(139.69, 35.68);
        assert!((geo_distance(a, b) - geo_distance(b, a)).abs() < EPS);
    }

    #[test]
    fn sanitized_rejects_non_finite() {
        assert!(GeoPoint::sanitized(f64::NAN, 0.0).is_none());
        assert!(GeoPoint::sanitized(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn sanitized_wraps_and_clamps() {
        let p = GeoPoint::sanitized(190.0, 95.0).unwrap();
        assert!((p.longitude - -170.0).abs() < EPS);
        assert_eq!(p.latitude, 90.0);
        assert!(p.in_range());

        let q = GeoPoint::sanitized(-540.0, -120.0).unwrap();
        assert!((q.longitude - -180.0).abs() < EPS);
        assert_eq!(q.latitude, -90.0);
    }

    #[test]
    fn wrap_keeps_antimeridian_sign() {
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-180.0), -180.0);
        assert!((wrap_longitude(360.0 + 45.0) - 45.0).abs() < EPS);
    }

    #[test]
    fn unit_vector_round_trip() {
        let p = GeoPoint::new(-73.9, 40.7);
        let back = GeoPoint::from_unit_vector(p.to_unit_vector());
        assert!((back.longitude - p.longitude).abs() < 1e-9);
        assert!((back.latitude - p.latitude).abs() < 1e-9);
    }
}
