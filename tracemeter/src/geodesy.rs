//! Great-circle distance calculations.
//!
//! All distances are in meters. The haversine formula over a spherical Earth
//! is accurate to ~0.5% against the true ellipsoid, which is well within GPS
//! sensor noise for activity tracking.

use crate::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate the great-circle distance between two points in meters.
///
/// Symmetric: `haversine_distance(a, b) == haversine_distance(b, a)`.
/// Returns 0 for identical points.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Calculate the total length of a path in meters by summing consecutive
/// point-pair distances.
///
/// The live engine accumulates distance incrementally as fixes are accepted;
/// this full recomputation exists for verification and tests.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}
