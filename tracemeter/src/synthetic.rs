//! Deterministic fix-stream generation for tests.
//!
//! Builds scripted sequences of (point, accuracy) pairs without any
//! randomness, so filter and session tests are exactly reproducible.
//! Only compiled with the `synthetic` feature.

use crate::GeoPoint;

/// Meters of northward travel per degree of latitude (spherical approximation).
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// A scripted GPS fix: a position plus its reported accuracy.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticFix {
    pub point: GeoPoint,
    pub accuracy_m: f64,
}

/// Builder for deterministic fix streams.
///
/// The cursor starts at the origin and each step moves it north by the given
/// spacing, so true displacement between consecutive fixes is known exactly
/// (within the haversine spherical model).
///
/// # Example
/// ```
/// use tracemeter::synthetic::FixSequence;
///
/// let fixes = FixSequence::starting_at(51.5074, -0.1278)
///     .walk_north(10, 10.0, 5.0)
///     .into_fixes();
/// assert_eq!(fixes.len(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct FixSequence {
    cursor: GeoPoint,
    fixes: Vec<SyntheticFix>,
}

impl FixSequence {
    /// Start a sequence at the given origin. No fix is emitted for the
    /// origin itself; the first step produces the first fix.
    pub fn starting_at(latitude: f64, longitude: f64) -> Self {
        Self {
            cursor: GeoPoint::new(latitude, longitude),
            fixes: Vec::new(),
        }
    }

    /// Emit a fix at the current cursor without moving.
    pub fn fix_here(mut self, accuracy_m: f64) -> Self {
        self.fixes.push(SyntheticFix {
            point: self.cursor,
            accuracy_m,
        });
        self
    }

    /// Walk north in `steps` strides of `spacing_m` meters, emitting one fix
    /// per stride with a constant reported accuracy.
    pub fn walk_north(mut self, steps: usize, spacing_m: f64, accuracy_m: f64) -> Self {
        for _ in 0..steps {
            self.advance_north(spacing_m);
            self.fixes.push(SyntheticFix {
                point: self.cursor,
                accuracy_m,
            });
        }
        self
    }

    /// Walk north with one stride per entry in `accuracies`, so accuracy
    /// patterns (e.g. alternating good/bad) line up with known displacement.
    pub fn walk_north_with_accuracies(mut self, spacing_m: f64, accuracies: &[f64]) -> Self {
        for &accuracy_m in accuracies {
            self.advance_north(spacing_m);
            self.fixes.push(SyntheticFix {
                point: self.cursor,
                accuracy_m,
            });
        }
        self
    }

    /// Emit `count` fixes jittering within `radius_m` of the current cursor
    /// without advancing it, simulating a stationary device.
    pub fn jitter_cluster(mut self, count: usize, radius_m: f64, accuracy_m: f64) -> Self {
        let offset_deg = radius_m / METERS_PER_DEGREE_LAT;
        for i in 0..count {
            // Alternate a small north/south wobble around the cursor
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            self.fixes.push(SyntheticFix {
                point: GeoPoint::new(
                    self.cursor.latitude + sign * offset_deg,
                    self.cursor.longitude,
                ),
                accuracy_m,
            });
        }
        self
    }

    /// The scripted fixes so far.
    pub fn fixes(&self) -> &[SyntheticFix] {
        &self.fixes
    }

    /// Consume the builder and return the scripted fixes.
    pub fn into_fixes(self) -> Vec<SyntheticFix> {
        self.fixes
    }

    fn advance_north(&mut self, meters: f64) {
        self.cursor = GeoPoint::new(
            self.cursor.latitude + meters / METERS_PER_DEGREE_LAT,
            self.cursor.longitude,
        );
    }
}
