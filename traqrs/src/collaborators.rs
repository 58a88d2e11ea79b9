//! External collaborator contracts.
//!
//! The engine consumes three host-provided services: the activity catalog
//! (reference data), the body-mass provider (read-only profile lookup), and
//! the workout sink (accepts one finalized record per session). All three are
//! foreign-implemented traits; [`BuiltinCatalog`] is a bundled default so
//! hosts and tests can run without wiring their own catalog.

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::finalize::WorkoutRecord;

/// An entry in the activity catalog. Immutable reference data; never mutated
/// by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDefinition {
    pub id: String,
    pub name: String,
    /// Metabolic equivalent factor used for energy estimation.
    pub met_coefficient: f64,
    /// Whether sessions of this activity record a GPS path.
    pub supports_gps: bool,
}

/// Catalog of activity definitions.
#[uniffi::export(with_foreign)]
pub trait ActivityCatalog: Send + Sync {
    /// Look up a definition by id. `None` is a fatal precondition failure
    /// when starting a session.
    fn activity_definition(&self, id: String) -> Option<ActivityDefinition>;
}

/// Read-only access to the user's most recent body-weight record.
#[uniffi::export(with_foreign)]
pub trait BodyMassProvider: Send + Sync {
    /// Latest known body mass, or `None` if no weight record exists. Missing
    /// data never blocks tracking; a configured default mass is substituted.
    fn latest_body_mass_kg(&self) -> Option<f64>;
}

/// Acknowledgement from the workout log sink.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub message: String,
}

/// Accepts finalized workout records.
///
/// Called exactly once per finish attempt; retry policy, if any, lives
/// behind this interface, not in the engine.
#[uniffi::export(with_foreign)]
pub trait WorkoutSink: Send + Sync {
    fn submit_workout(&self, record: WorkoutRecord) -> Result<SubmitReceipt, TrackerError>;
}

// ============================================================================
// Builtin Catalog
// ============================================================================

/// MET coefficients from the Compendium of Physical Activities
/// (Ainsworth et al., 2011 update).
///
/// Walking, brisk pace (~5.5 km/h). Compendium code 17190.
pub const MET_WALKING: f64 = 3.5;
/// Running at ~9.7 km/h (6 mph). Compendium code 12050.
pub const MET_RUNNING: f64 = 9.8;
/// Cycling, general leisure pace. Compendium code 01015.
pub const MET_CYCLING: f64 = 7.5;
/// Hiking cross country. Compendium code 17080.
pub const MET_HIKING: f64 = 6.0;

/// Bundled default catalog covering the standard cardio activities.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    definitions: Vec<ActivityDefinition>,
}

impl BuiltinCatalog {
    pub fn new() -> Self {
        let entry = |id: &str, name: &str, met_coefficient: f64| ActivityDefinition {
            id: id.to_string(),
            name: name.to_string(),
            met_coefficient,
            supports_gps: true,
        };
        Self {
            definitions: vec![
                entry("walking", "Walking", MET_WALKING),
                entry("running", "Running", MET_RUNNING),
                entry("cycling", "Cycling", MET_CYCLING),
                entry("hiking", "Hiking", MET_HIKING),
            ],
        }
    }

    /// All bundled definitions.
    pub fn definitions(&self) -> &[ActivityDefinition] {
        &self.definitions
    }
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityCatalog for BuiltinCatalog {
    fn activity_definition(&self, id: String) -> Option<ActivityDefinition> {
        self.definitions.iter().find(|d| d.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = BuiltinCatalog::new();
        let running = catalog
            .activity_definition("running".to_string())
            .expect("running should exist");
        assert_eq!(running.met_coefficient, 9.8);
        assert!(running.supports_gps);
    }

    #[test]
    fn test_unknown_activity_is_none() {
        let catalog = BuiltinCatalog::new();
        assert!(catalog.activity_definition("yoga".to_string()).is_none());
    }
}
