//! FFI surface.
//!
//! Thin wrappers over the [`Tracker`] singleton. Each function locks the
//! singleton, runs the operation, and maps the outcome into FFI-friendly
//! types; no session logic lives here.

use std::sync::Arc;

use log::{info, warn};

use crate::collaborators::{ActivityCatalog, BodyMassProvider, WorkoutSink};
use crate::error::TrackerError;
use crate::finalize::WorkoutRecord;
use crate::location::{GeoFix, LocationError, LocationSource};
use crate::persistence::SqliteSnapshotStore;
use crate::tracker::{TRACKER, Tracker, TrackerConfig, with_tracker};
use crate::types::{LiveMetrics, RecoveryOutcome};

/// Initialize the tracking engine with its durable store and host
/// collaborators. Returns `false` if the database could not be opened.
/// Calling again replaces the previous instance.
#[uniffi::export]
pub fn ffi_tracker_init(
    db_path: String,
    location: Arc<dyn LocationSource>,
    catalog: Arc<dyn ActivityCatalog>,
    body_mass: Arc<dyn BodyMassProvider>,
    sink: Arc<dyn WorkoutSink>,
) -> bool {
    crate::init_logging();

    let store = match SqliteSnapshotStore::new(&db_path) {
        Ok(store) => store,
        Err(e) => {
            warn!("traq: [Tracker] Failed to open store at {}: {}", db_path, e);
            return false;
        }
    };
    let tracker = Tracker::new(
        Box::new(store),
        location,
        catalog,
        body_mass,
        sink,
        TrackerConfig::default(),
    );

    match TRACKER.lock() {
        Ok(mut guard) => {
            *guard = Some(Arc::new(tracker));
            info!("traq: [Tracker] Initialized with store at {}", db_path);
            true
        }
        Err(e) => {
            warn!("traq: [Tracker] Singleton lock poisoned: {}", e);
            false
        }
    }
}

#[uniffi::export]
pub fn ffi_tracker_is_initialized() -> bool {
    with_tracker(|_| ()).is_some()
}

/// Start a session for the given catalog activity.
#[uniffi::export]
pub fn ffi_start_session(activity_id: String) -> Result<LiveMetrics, TrackerError> {
    with_tracker(|t| t.start(&activity_id)).ok_or(TrackerError::NotInitialized)?
}

/// Pause the running session. Idempotent while paused.
#[uniffi::export]
pub fn ffi_pause_session() -> Result<LiveMetrics, TrackerError> {
    with_tracker(|t| t.pause()).ok_or(TrackerError::NotInitialized)?
}

/// Resume a paused session.
#[uniffi::export]
pub fn ffi_resume_session() -> Result<LiveMetrics, TrackerError> {
    with_tracker(|t| t.resume()).ok_or(TrackerError::NotInitialized)?
}

/// Finish the session, submit it to the workout log, and return the
/// finalized record. On submission failure the session is retained and this
/// call can be retried.
#[uniffi::export]
pub fn ffi_finish_session() -> Result<WorkoutRecord, TrackerError> {
    with_tracker(|t| t.finish()).ok_or(TrackerError::NotInitialized)?
}

/// Discard the session without saving.
#[uniffi::export]
pub fn ffi_abandon_session() -> Result<(), TrackerError> {
    with_tracker(|t| t.abandon()).ok_or(TrackerError::NotInitialized)?
}

/// Reconcile any interrupted session from the durable store. Call once at
/// app launch, after init.
#[uniffi::export]
pub fn ffi_recover_session() -> RecoveryOutcome {
    with_tracker(|t| t.recover()).unwrap_or(RecoveryOutcome::NoSession)
}

/// Read-only snapshot of the live session, or `None` when idle.
#[uniffi::export]
pub fn ffi_session_metrics() -> Option<LiveMetrics> {
    with_tracker(|t| t.metrics()).flatten()
}

/// The session path as flat `[lat1, lng1, lat2, lng2, ...]` pairs, for map
/// rendering without per-point object crossings.
#[uniffi::export]
pub fn ffi_session_path() -> Vec<f64> {
    with_tracker(|t| t.path_flat()).unwrap_or_default()
}

/// One fresh high-accuracy fix, independent of any session.
#[uniffi::export]
pub fn ffi_current_fix() -> Result<GeoFix, LocationError> {
    with_tracker(|t| t.current_fix()).unwrap_or(Err(LocationError::Unavailable {
        message: "tracker not initialized".to_string(),
    }))
}

// Stateless measurement helpers, exported so the UI formats values the same
// way the engine does.

#[uniffi::export]
pub fn ffi_format_distance(meters: f64) -> String {
    tracemeter::format_distance(meters)
}

#[uniffi::export]
pub fn ffi_format_pace(elapsed_seconds: f64, meters: f64) -> String {
    tracemeter::format_pace(elapsed_seconds, meters)
}

#[uniffi::export]
pub fn ffi_format_duration(elapsed_seconds: u64) -> String {
    tracemeter::format_duration(elapsed_seconds)
}

#[uniffi::export]
pub fn ffi_estimate_calories(met_coefficient: f64, body_mass_kg: f64, elapsed_seconds: u64) -> u32 {
    tracemeter::estimate_calories(met_coefficient, body_mass_kg, elapsed_seconds)
}
