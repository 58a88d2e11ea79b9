//! Shared host-side fakes for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tracemeter::synthetic::SyntheticFix;
use traqrs::collaborators::{
    ActivityCatalog, ActivityDefinition, BodyMassProvider, SubmitReceipt, WorkoutSink,
};
use traqrs::error::TrackerError;
use traqrs::finalize::WorkoutRecord;
use traqrs::location::{FixRelay, GeoFix, LocationError, LocationSource};
use traqrs::persistence::SqliteSnapshotStore;
use traqrs::tracker::{Tracker, TrackerConfig};

/// Location fake standing in for the platform location service. Remembers
/// the relay from `open_stream` so tests can deliver scripted fixes the way
/// the platform callback would.
#[derive(Default)]
pub struct HostLocation {
    relay: Mutex<Option<Arc<FixRelay>>>,
    pub opens: AtomicU32,
    pub closes: AtomicU32,
    deny: AtomicBool,
}

impl HostLocation {
    pub fn denying() -> Self {
        let fake = Self::default();
        fake.deny.store(true, Ordering::SeqCst);
        fake
    }

    /// Deliver scripted fixes through the relay, one second apart.
    pub fn deliver(&self, fixes: &[SyntheticFix], base_ms: i64) {
        let guard = self.relay.lock().unwrap();
        let relay = guard.as_ref().expect("stream not open");
        for (i, fix) in fixes.iter().enumerate() {
            relay.report(GeoFix {
                latitude: fix.point.latitude,
                longitude: fix.point.longitude,
                accuracy_m: fix.accuracy_m,
                captured_at_ms: base_ms + (i as i64) * 1000,
            });
        }
    }
}

impl LocationSource for HostLocation {
    fn current_fix(&self, _timeout_secs: u32) -> Result<GeoFix, LocationError> {
        Ok(GeoFix {
            latitude: 51.5074,
            longitude: -0.1278,
            accuracy_m: 5.0,
            captured_at_ms: 0,
        })
    }

    fn open_stream(&self, relay: Arc<FixRelay>) -> Result<u64, LocationError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(LocationError::PermissionDenied);
        }
        *self.relay.lock().unwrap() = Some(relay);
        Ok(self.opens.fetch_add(1, Ordering::SeqCst) as u64 + 1)
    }

    fn close_stream(&self, _handle: u64) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct StaticMass(pub Option<f64>);

impl BodyMassProvider for StaticMass {
    fn latest_body_mass_kg(&self) -> Option<f64> {
        self.0
    }
}

/// Sink fake that records everything submitted and can be scripted to
/// reject.
#[derive(Default)]
pub struct RecordingSink {
    pub accept: AtomicBool,
    pub submissions: Mutex<Vec<WorkoutRecord>>,
}

impl RecordingSink {
    pub fn accepting() -> Self {
        let sink = Self::default();
        sink.accept.store(true, Ordering::SeqCst);
        sink
    }
}

impl WorkoutSink for RecordingSink {
    fn submit_workout(&self, record: WorkoutRecord) -> Result<SubmitReceipt, TrackerError> {
        if !self.accept.load(Ordering::SeqCst) {
            return Err(TrackerError::Submission {
                message: "workout log offline".to_string(),
            });
        }
        self.submissions.lock().unwrap().push(record);
        Ok(SubmitReceipt {
            message: "saved".to_string(),
        })
    }
}

/// Catalog with one indoor activity, for sessions without a GPS path.
pub struct IndoorCatalog;

impl ActivityCatalog for IndoorCatalog {
    fn activity_definition(&self, id: String) -> Option<ActivityDefinition> {
        (id == "treadmill").then(|| ActivityDefinition {
            id,
            name: "Treadmill".to_string(),
            met_coefficient: 9.8,
            supports_gps: false,
        })
    }
}

pub struct Host {
    pub tracker: Tracker,
    pub location: Arc<HostLocation>,
    pub sink: Arc<RecordingSink>,
}

/// A tracker over a SQLite store at `db_path`, with the given collaborators.
/// The tick interval is long so the wall-clock ticker never interferes with
/// assertions; elapsed-time behavior is exercised through recovery.
pub fn host_at(
    db_path: &str,
    location: HostLocation,
    catalog: Arc<dyn ActivityCatalog>,
    sink: RecordingSink,
) -> Host {
    let store = SqliteSnapshotStore::new(db_path).expect("open store");
    let location = Arc::new(location);
    let sink = Arc::new(sink);
    let tracker = Tracker::new(
        Box::new(store),
        location.clone(),
        catalog,
        Arc::new(StaticMass(Some(80.0))),
        sink.clone(),
        TrackerConfig {
            tick_interval_ms: 600_000,
            ..TrackerConfig::default()
        },
    );
    Host {
        tracker,
        location,
        sink,
    }
}

pub fn default_host_at(db_path: &str) -> Host {
    host_at(
        db_path,
        HostLocation::default(),
        Arc::new(traqrs::collaborators::BuiltinCatalog::new()),
        RecordingSink::accepting(),
    )
}
