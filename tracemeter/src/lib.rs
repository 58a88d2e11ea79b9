//! # Tracemeter
//!
//! Pure measurement library for live GPS activity tracking.
//!
//! This library provides:
//! - Haversine great-circle distance and path length
//! - Distance, pace, and duration formatting for display
//! - MET-based energy expenditure estimation
//! - The fix-acceptance policy used to filter raw GPS fixes
//!
//! Everything here is side-effect free: no I/O, no clock, no global state.
//! The app layer (`traqrs`) owns sessions, sensors, and persistence.
//!
//! ## Quick Start
//!
//! ```rust
//! use tracemeter::{GeoPoint, haversine_distance};
//!
//! let london = GeoPoint::new(51.5074, -0.1278);
//! let paris = GeoPoint::new(48.8566, 2.3522);
//! let distance = haversine_distance(&london, &paris);
//! println!("London to Paris: {:.0} km", distance / 1000.0);
//! ```

use serde::{Deserialize, Serialize};

// Great-circle distance and path length
pub mod geodesy;
pub use geodesy::{EARTH_RADIUS_M, haversine_distance, path_length};

// Display formatting for distance, pace, and duration
pub mod format;
pub use format::{format_distance, format_duration, format_pace};

// MET-based energy expenditure estimation
pub mod energy;
pub use energy::estimate_calories;

// Fix-acceptance policy (accuracy ceiling + minimum displacement)
pub mod filter;
pub use filter::{FilterConfig, FixDecision, assess};

// Deterministic fix-stream generation for tests
#[cfg(feature = "synthetic")]
pub mod synthetic;
#[cfg(feature = "synthetic")]
pub use synthetic::{FixSequence, SyntheticFix};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use tracemeter::GeoPoint;
/// let point = GeoPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_validity() {
        assert!(GeoPoint::new(51.5074, -0.1278).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }
}
