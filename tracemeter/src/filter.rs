//! Fix-acceptance policy.
//!
//! Raw GPS fixes pass through a two-stage filter before they are allowed to
//! extend a session's path:
//!
//! 1. Fixes with reported accuracy worse than the ceiling are rejected as
//!    sensor noise.
//! 2. Fixes closer than the minimum displacement to the last accepted point
//!    are rejected as stationary jitter, so distance does not inflate while
//!    the device sits in a pocket.
//!
//! Both thresholds are policy constants tuned against observed device
//! behavior, not hard mathematical requirements.

use crate::GeoPoint;
use crate::geodesy::haversine_distance;
use serde::{Deserialize, Serialize};

/// Configuration for the fix-acceptance filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Maximum reported accuracy for a fix to be considered at all.
    /// Default: 50.0 meters
    pub max_accuracy_m: f64,

    /// Minimum displacement from the last accepted point for a fix to
    /// extend the path. Default: 2.0 meters
    pub min_displacement_m: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: 50.0,
            min_displacement_m: 2.0,
        }
    }
}

/// Outcome of assessing a single fix against the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixDecision {
    /// First accepted point of the session; contributes no distance.
    First,
    /// Accepted; the path advances by `meters`.
    Advance { meters: f64 },
    /// Rejected: reported accuracy exceeds the ceiling.
    RejectedAccuracy,
    /// Rejected: displacement below the jitter threshold.
    RejectedJitter,
}

impl FixDecision {
    /// Whether the fix should be appended to the path.
    pub fn is_accepted(&self) -> bool {
        matches!(self, FixDecision::First | FixDecision::Advance { .. })
    }
}

/// Assess a candidate fix against the two-stage filter.
///
/// `last_accepted` is the most recent path point, or `None` when the path is
/// empty (the first acceptable fix is always taken, with zero distance).
pub fn assess(
    config: &FilterConfig,
    last_accepted: Option<&GeoPoint>,
    candidate: &GeoPoint,
    accuracy_m: f64,
) -> FixDecision {
    if accuracy_m > config.max_accuracy_m {
        return FixDecision::RejectedAccuracy;
    }

    let Some(last) = last_accepted else {
        return FixDecision::First;
    };

    let meters = haversine_distance(last, candidate);
    if meters <= config.min_displacement_m {
        FixDecision::RejectedJitter
    } else {
        FixDecision::Advance { meters }
    }
}
