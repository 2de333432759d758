//! Great-circle geometry on a spherical Earth.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by [`haversine_distance`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A single position fix in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoReading {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoReading {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Surface distance in meters between two points, via the haversine formula.
///
/// Identical points yield exactly `0.0`.
#[must_use]
pub fn haversine_distance(from: GeoReading, to: GeoReading) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_phi = (to.latitude - from.latitude).to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let half_phi = (delta_phi / 2.0).sin();
    let half_lambda = (delta_lambda / 2.0).sin();
    let a = half_phi * half_phi + phi1.cos() * phi2.cos() * half_lambda * half_lambda;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        let d = haversine_distance(GeoReading::new(0.0, 0.0), GeoReading::new(0.0, 1.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn identical_points_are_exactly_zero() {
        let p = GeoReading::new(40.0, -74.0);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoReading::new(51.5007, -0.1246);
        let b = GeoReading::new(48.8584, 2.2945);
        let ab = haversine_distance(a, b);
        let ba = haversine_distance(b, a);
        assert!((ab - ba).abs() < 1e-6);
        // London to Paris, roughly 340 km.
        assert!((ab - 340_000.0).abs() < 10_000.0, "got {ab}");
    }

    #[test]
    fn small_latitude_step() {
        let d = haversine_distance(GeoReading::new(40.001, -74.0), GeoReading::new(40.0, -74.0));
        assert!((d - 111.2).abs() < 0.1, "got {d}");
    }
}
