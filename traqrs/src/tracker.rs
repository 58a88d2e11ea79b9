//! Tracker: the serialized owner of the session engine.
//!
//! Two asynchronous producers feed the engine: a 1 Hz ticker thread and the
//! host's location stream (via `FixRelay`). Both funnel through the engine's
//! mutex, and both carry cancellation guards (the ticker checks the run
//! generation, the relay checks session status), so an event that races a
//! transition is dropped rather than applied late.
//!
//! Foreign collaborator calls (`open_stream`, `close_stream`,
//! `submit_workout`) never run under the engine lock; state mutations always
//! do, with the durable snapshot written inside the same critical section.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};
use once_cell::sync::Lazy;
use tracemeter::FilterConfig;

use crate::collaborators::{ActivityCatalog, BodyMassProvider, WorkoutSink};
use crate::error::{Result, TrackerError};
use crate::finalize::{WorkoutRecord, build_record};
use crate::location::{FixRelay, GeoFix, LocationError, LocationSource};
use crate::now_ms;
use crate::persistence::SnapshotStore;
use crate::session::{SessionEngine, SessionStatus};
use crate::types::{LiveMetrics, RecoveryOutcome};

/// Tunable engine policy. Defaults match the published tracking behavior.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Fix-acceptance thresholds.
    pub filter: FilterConfig,

    /// Clock tick interval. Default: 1000 ms (elapsed time is counted in
    /// whole seconds).
    pub tick_interval_ms: u64,

    /// Bound on the single-shot fix request. Default: 10 s
    pub fix_timeout_secs: u32,

    /// Body mass substituted when the profile has no weight record.
    /// Default: 70.0 kg
    pub default_body_mass_kg: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            tick_interval_ms: 1000,
            fix_timeout_secs: 10,
            default_body_mass_kg: 70.0,
        }
    }
}

/// Owns the session engine and wires it to the host collaborators.
pub struct Tracker {
    engine: Arc<Mutex<SessionEngine>>,
    location: Arc<dyn LocationSource>,
    catalog: Arc<dyn ActivityCatalog>,
    body_mass: Arc<dyn BodyMassProvider>,
    sink: Arc<dyn WorkoutSink>,
    relay: Arc<FixRelay>,
    stream: Mutex<Option<u64>>,
    /// The live ticker and the generation it was spawned for. One ticker per
    /// run generation, ever.
    ticker: Mutex<Option<(u64, JoinHandle<()>)>>,
    config: TrackerConfig,
}

impl Tracker {
    pub fn new(
        store: Box<dyn SnapshotStore>,
        location: Arc<dyn LocationSource>,
        catalog: Arc<dyn ActivityCatalog>,
        body_mass: Arc<dyn BodyMassProvider>,
        sink: Arc<dyn WorkoutSink>,
        config: TrackerConfig,
    ) -> Self {
        let engine = Arc::new(Mutex::new(SessionEngine::new(
            store,
            config.filter.clone(),
        )));
        let relay = Arc::new(FixRelay::new(Arc::downgrade(&engine)));
        Self {
            engine,
            location,
            catalog,
            body_mass,
            sink,
            relay,
            stream: Mutex::new(None),
            ticker: Mutex::new(None),
            config,
        }
    }

    // ========================================================================
    // Session operations
    // ========================================================================

    /// Start a session for the given activity.
    ///
    /// Resolves the definition and body mass up front, opens the location
    /// stream (for GPS activities) before the session runs, and starts the
    /// ticker. Permission denial leaves the engine idle.
    pub fn start(&self, activity_id: &str) -> Result<LiveMetrics> {
        let definition = self
            .catalog
            .activity_definition(activity_id.to_string())
            .ok_or_else(|| TrackerError::UnknownActivity {
                activity_id: activity_id.to_string(),
            })?;
        if self.lock_engine()?.state().is_some() {
            return Err(TrackerError::SessionActive);
        }

        // Missing weight data never blocks tracking
        let body_mass_kg = self
            .body_mass
            .latest_body_mass_kg()
            .unwrap_or(self.config.default_body_mass_kg);

        if definition.supports_gps {
            self.open_stream()?;
        }

        let metrics = {
            let mut engine = self.lock_engine()?;
            if let Err(e) = engine.begin(&definition, body_mass_kg, now_ms()) {
                drop(engine);
                self.close_stream();
                return Err(e);
            }
            engine
                .state()
                .map(LiveMetrics::from_state)
                .ok_or(TrackerError::NoSession)?
        };

        self.spawn_ticker();
        info!("traq: [Tracker] Session started for '{}'", activity_id);
        Ok(metrics)
    }

    /// Pause the running session. The clock stops and the location stream is
    /// closed so no background fix consumption happens while paused.
    pub fn pause(&self) -> Result<LiveMetrics> {
        let metrics = {
            let mut engine = self.lock_engine()?;
            engine.pause(now_ms())?;
            engine
                .state()
                .map(LiveMetrics::from_state)
                .ok_or(TrackerError::NoSession)?
        };
        self.close_stream();
        self.drop_ticker();
        Ok(metrics)
    }

    /// Resume a paused session: reopen the stream, restart the clock.
    pub fn resume(&self) -> Result<LiveMetrics> {
        let supports_gps = self
            .lock_engine()?
            .state()
            .map(|s| s.supports_gps)
            .ok_or(TrackerError::NoSession)?;

        if supports_gps {
            self.open_stream()?;
        }

        let metrics = {
            let mut engine = self.lock_engine()?;
            if let Err(e) = engine.resume(now_ms()) {
                drop(engine);
                self.close_stream();
                return Err(e);
            }
            engine
                .state()
                .map(LiveMetrics::from_state)
                .ok_or(TrackerError::NoSession)?
        };

        self.spawn_ticker();
        Ok(metrics)
    }

    /// Finish the session and submit it to the workout log.
    ///
    /// The sink is called exactly once per attempt. On success the snapshot
    /// is deleted and the engine returns to idle; on failure the finished
    /// state and its snapshot are retained, and calling `finish` again
    /// retries submission without data loss.
    pub fn finish(&self) -> Result<WorkoutRecord> {
        let record = {
            let mut engine = self.lock_engine()?;
            engine.mark_finished(now_ms())?;
            let state = engine.state().ok_or(TrackerError::NoSession)?;
            build_record(state, now_ms())?
        };
        self.close_stream();
        self.drop_ticker();

        let receipt = self.sink.submit_workout(record.clone())?;
        info!("traq: [Tracker] Workout submitted: {}", receipt.message);

        self.lock_engine()?.clear();
        Ok(record)
    }

    /// Discard the session without saving. Legal from any state, including a
    /// finished session whose submission keeps failing.
    pub fn abandon(&self) -> Result<()> {
        self.lock_engine()?.clear();
        self.close_stream();
        self.drop_ticker();
        info!("traq: [Tracker] Session abandoned");
        Ok(())
    }

    /// Reconcile any interrupted session from the durable store.
    ///
    /// A recovered running session resumes ticking and resubscribes to
    /// location; if the stream cannot be reopened (e.g. permission revoked
    /// while the app was dead) the session is restored paused instead.
    pub fn recover(&self) -> RecoveryOutcome {
        let recovered = {
            let Ok(mut engine) = self.engine.lock() else {
                return RecoveryOutcome::NoSession;
            };
            match engine.recover(now_ms()) {
                None => return RecoveryOutcome::NoSession,
                Some(status) => engine
                    .state()
                    .map(|s| (status, s.supports_gps, LiveMetrics::from_state(s))),
            }
        };
        let Some((status, supports_gps, metrics)) = recovered else {
            return RecoveryOutcome::NoSession;
        };

        match status {
            SessionStatus::Running => {
                if supports_gps {
                    if let Err(e) = self.open_stream() {
                        warn!(
                            "traq: [Tracker] Stream unavailable after recovery ({}), restoring paused",
                            e
                        );
                        return self.pause_after_recovery(metrics);
                    }
                }
                self.spawn_ticker();
                RecoveryOutcome::ResumedRunning { metrics }
            }
            SessionStatus::Paused => RecoveryOutcome::RestoredPaused { metrics },
            SessionStatus::Finished => RecoveryOutcome::AwaitingSubmit { metrics },
            SessionStatus::Idle => RecoveryOutcome::NoSession,
        }
    }

    fn pause_after_recovery(&self, fallback: LiveMetrics) -> RecoveryOutcome {
        let metrics = match self.engine.lock() {
            Ok(mut engine) => {
                let _ = engine.pause(now_ms());
                engine
                    .state()
                    .map(LiveMetrics::from_state)
                    .unwrap_or(fallback)
            }
            Err(_) => fallback,
        };
        RecoveryOutcome::RestoredPaused { metrics }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// Read-only snapshot of the live session, if any.
    pub fn metrics(&self) -> Option<LiveMetrics> {
        self.engine
            .lock()
            .ok()?
            .state()
            .map(LiveMetrics::from_state)
    }

    /// The session path as flat `[lat1, lng1, lat2, lng2, ...]` pairs.
    pub fn path_flat(&self) -> Vec<f64> {
        let Ok(engine) = self.engine.lock() else {
            return Vec::new();
        };
        engine
            .state()
            .map(|s| {
                s.path
                    .iter()
                    .flat_map(|p| [p.latitude, p.longitude])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// One fresh high-accuracy fix, independent of any session.
    pub fn current_fix(&self) -> std::result::Result<GeoFix, LocationError> {
        self.location.current_fix(self.config.fix_timeout_secs)
    }

    // ========================================================================
    // Producers
    // ========================================================================

    fn spawn_ticker(&self) {
        let generation = match self.engine.lock() {
            Ok(engine) => engine.generation(),
            Err(_) => return,
        };
        let Ok(mut slot) = self.ticker.lock() else {
            return;
        };
        // An idempotent resume lands here without a transition. The ticker
        // for this generation is already counting; a second one would pass
        // the same generation check and run the clock at double speed.
        if slot.as_ref().is_some_and(|(g, _)| *g == generation) {
            return;
        }
        let engine: Weak<Mutex<SessionEngine>> = Arc::downgrade(&self.engine);
        let interval = Duration::from_millis(self.config.tick_interval_ms);

        let spawned = thread::Builder::new()
            .name("traq-ticker".to_string())
            .spawn(move || {
                loop {
                    thread::sleep(interval);
                    let Some(engine) = engine.upgrade() else {
                        break;
                    };
                    let Ok(mut guard) = engine.lock() else {
                        break;
                    };
                    if guard.generation() != generation {
                        break;
                    }
                    guard.tick(generation, now_ms());
                }
            });

        match spawned {
            Ok(handle) => {
                // A ticker from an older generation, if any, exits on its
                // own via the generation check
                *slot = Some((generation, handle));
            }
            Err(e) => warn!("traq: [Tracker] Failed to spawn ticker: {}", e),
        }
    }

    fn drop_ticker(&self) {
        if let Ok(mut slot) = self.ticker.lock() {
            // Detach rather than join: the thread observes the bumped
            // generation on its next wake and exits
            slot.take();
        }
    }

    fn open_stream(&self) -> Result<()> {
        let Ok(mut guard) = self.stream.lock() else {
            return Err(TrackerError::Persistence {
                message: "stream handle lock poisoned".to_string(),
            });
        };
        if guard.is_some() {
            return Ok(());
        }
        let handle = self.location.open_stream(Arc::clone(&self.relay))?;
        *guard = Some(handle);
        Ok(())
    }

    fn close_stream(&self) {
        if let Ok(mut guard) = self.stream.lock()
            && let Some(handle) = guard.take()
        {
            self.location.close_stream(handle);
        }
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, SessionEngine>> {
        self.engine.lock().map_err(|_| TrackerError::Persistence {
            message: "engine lock poisoned".to_string(),
        })
    }
}

// ============================================================================
// Singleton
// ============================================================================

/// Global tracker instance.
///
/// This singleton lets FFI calls share one tracker without passing state
/// back and forth across the boundary.
pub static TRACKER: Lazy<Mutex<Option<Arc<Tracker>>>> = Lazy::new(|| Mutex::new(None));

/// Run a closure against the global tracker, if initialized.
pub fn with_tracker<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&Arc<Tracker>) -> R,
{
    let guard = TRACKER.lock().ok()?;
    guard.as_ref().map(f)
}
