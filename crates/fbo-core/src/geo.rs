//! Great-circle distance math for airport networks.

use serde::{Deserialize, Serialize};

/// Earth radius used for all network distances, in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Distance to another point in nautical miles.
    pub fn distance_nm(&self, other: &GeoPoint) -> f64 {
        haversine_nm(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Something that may sit at a known position.
///
/// Records with a missing latitude or longitude return `None` and are
/// skipped by every position-based calculation.
pub trait Located {
    fn position(&self) -> Option<GeoPoint>;
}

impl Located for GeoPoint {
    fn position(&self) -> Option<GeoPoint> {
        Some(*self)
    }
}

impl<T: Located> Located for Option<T> {
    fn position(&self) -> Option<GeoPoint> {
        self.as_ref().and_then(Located::position)
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn position(&self) -> Option<GeoPoint> {
        (**self).position()
    }
}

/// Calculate distance between two points in nautical miles (Haversine formula).
pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_NM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Distances for every unordered pair of positioned nodes.
///
/// Yields `(i, j, distance_nm)` with `i < j` indexing into `nodes`, in
/// row-major order. Unpositioned nodes never appear.
pub fn pairwise_distances<N: Located>(nodes: &[N]) -> Vec<(usize, usize, f64)> {
    let positions: Vec<Option<GeoPoint>> = nodes.iter().map(Located::position).collect();
    let mut pairs = Vec::new();

    for (i, a) in positions.iter().enumerate() {
        let Some(a) = a else { continue };
        for (j, b) in positions.iter().enumerate().skip(i + 1) {
            if let Some(b) = b {
                pairs.push((i, j, a.distance_nm(b)));
            }
        }
    }

    pairs
}
