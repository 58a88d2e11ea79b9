//! Live activity tracking engine.
//!
//! Records GPS cardio sessions (start, pause, resume, finish) with
//! crash-resilient durable snapshots, noise-filtered path accumulation, and
//! MET-based energy estimation. The host platform supplies location, the
//! activity catalog, body mass, and the workout log sink through foreign
//! trait implementations; everything between the sensor callback and the
//! finalized workout record lives here.
//!
//! Measurement primitives (geodesy, formatting, energy, fix filtering) come
//! from the `tracemeter` crate; this crate adds the stateful engine and the
//! FFI surface.

uniffi::setup_scaffolding!();

pub mod collaborators;
pub mod error;
pub mod ffi;
pub mod finalize;
pub mod location;
pub mod persistence;
pub mod session;
pub mod tracker;
pub mod types;

pub use collaborators::{ActivityCatalog, ActivityDefinition, BodyMassProvider, WorkoutSink};
pub use error::TrackerError;
pub use finalize::WorkoutRecord;
pub use location::{FixRelay, GeoFix, LocationError, LocationSource};
pub use session::{SessionState, SessionStatus};
pub use tracker::{Tracker, TrackerConfig};
pub use types::{LiveMetrics, RecoveryOutcome};

/// Current wall-clock time as Unix epoch milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Initialize logging for Android
#[cfg(target_os = "android")]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("traqrs"),
    );
}

/// Initialize logging for iOS (repeat initialization is ignored)
#[cfg(target_os = "ios")]
pub(crate) fn init_logging() {
    use log::LevelFilter;

    let _ = oslog::OsLogger::new("com.traq.core")
        .level_filter(LevelFilter::Debug)
        .init();
}

#[cfg(not(any(target_os = "android", target_os = "ios")))]
pub(crate) fn init_logging() {
    // No-op on desktop platforms
}
