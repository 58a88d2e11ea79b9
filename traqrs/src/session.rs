//! Session state machine.
//!
//! The engine owns the one live [`SessionState`] and is the only writer to
//! it. All mutation entry points are expected to run under a single external
//! lock (see `tracker`); the timer and the location stream both funnel into
//! them. Every accepted mutation writes a durable snapshot before returning,
//! so a reader of the store never observes a state the engine has not
//! reached.
//!
//! Ticks carry a generation number taken when their producer was started;
//! every transition bumps the generation, so a tick that raced a transition
//! is recognized as stale and dropped.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tracemeter::{FilterConfig, FixDecision, GeoPoint, assess, estimate_calories};

use crate::collaborators::ActivityDefinition;
use crate::error::{Result, TrackerError};
use crate::location::GeoFix;
use crate::persistence::SnapshotStore;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
            SessionStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(SessionStatus::Idle),
            "running" => Some(SessionStatus::Running),
            "paused" => Some(SessionStatus::Paused),
            "finished" => Some(SessionStatus::Finished),
            _ => None,
        }
    }
}

/// The live session.
///
/// MET coefficient and body mass are resolved once at start and carried
/// here, so recovery after a crash and live/final energy math agree without
/// re-querying collaborators that may be offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub activity_id: String,
    pub status: SessionStatus,
    /// Whole seconds spent in `Running`. Frozen while paused.
    pub elapsed_seconds: u64,
    /// Cumulative geodesic distance over `path`. Never decreases.
    pub distance_meters: f64,
    pub met_coefficient: f64,
    pub body_mass_kg: f64,
    pub supports_gps: bool,
    /// Wall-clock start as Unix epoch milliseconds.
    pub started_at_ms: i64,
    /// Wall-clock time of the last durable snapshot. Used solely for
    /// time-gap reconciliation at recovery, never for display.
    pub last_persisted_at_ms: i64,
    /// Accepted path points, append-only while running. The authoritative
    /// polyline of the session.
    pub path: Vec<GeoPoint>,
}

impl SessionState {
    /// Energy estimate for the current elapsed time. The same formula serves
    /// live display and finalization.
    pub fn calories_burned(&self) -> u32 {
        estimate_calories(self.met_coefficient, self.body_mass_kg, self.elapsed_seconds)
    }
}

/// Owner of the live session and the single serialization point for its
/// mutations.
pub struct SessionEngine {
    state: Option<SessionState>,
    store: Box<dyn SnapshotStore>,
    filter: FilterConfig,
    /// Bumped on every transition; producers carrying an older generation
    /// are stale and their events are dropped.
    generation: u64,
}

impl SessionEngine {
    pub fn new(store: Box<dyn SnapshotStore>, filter: FilterConfig) -> Self {
        Self {
            state: None,
            store,
            filter,
            generation: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.state
            .as_ref()
            .map(|s| s.status)
            .unwrap_or(SessionStatus::Idle)
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Idle -> Running. Errors if a session already exists.
    pub fn begin(
        &mut self,
        definition: &ActivityDefinition,
        body_mass_kg: f64,
        now_ms: i64,
    ) -> Result<()> {
        if self.state.is_some() {
            return Err(TrackerError::SessionActive);
        }

        self.generation += 1;
        self.state = Some(SessionState {
            activity_id: definition.id.clone(),
            status: SessionStatus::Running,
            elapsed_seconds: 0,
            distance_meters: 0.0,
            met_coefficient: definition.met_coefficient,
            body_mass_kg,
            supports_gps: definition.supports_gps,
            started_at_ms: now_ms,
            last_persisted_at_ms: now_ms,
            path: Vec::new(),
        });
        info!(
            "traq: [Session] Started '{}' (MET {}, {} kg)",
            definition.id, definition.met_coefficient, body_mass_kg
        );
        self.persist(now_ms);
        Ok(())
    }

    /// Running -> Paused. Idempotent when already paused.
    pub fn pause(&mut self, now_ms: i64) -> Result<()> {
        match self.status() {
            SessionStatus::Running => {
                self.generation += 1;
                if let Some(state) = self.state.as_mut() {
                    state.status = SessionStatus::Paused;
                }
                info!("traq: [Session] Paused");
                self.persist(now_ms);
                Ok(())
            }
            SessionStatus::Paused => Ok(()),
            SessionStatus::Idle => Err(TrackerError::NoSession),
            from => Err(TrackerError::InvalidTransition {
                from: from.as_str().to_string(),
                action: "pause".to_string(),
            }),
        }
    }

    /// Paused -> Running. Idempotent when already running.
    pub fn resume(&mut self, now_ms: i64) -> Result<()> {
        match self.status() {
            SessionStatus::Paused => {
                self.generation += 1;
                if let Some(state) = self.state.as_mut() {
                    state.status = SessionStatus::Running;
                }
                info!("traq: [Session] Resumed");
                self.persist(now_ms);
                Ok(())
            }
            SessionStatus::Running => Ok(()),
            SessionStatus::Idle => Err(TrackerError::NoSession),
            from => Err(TrackerError::InvalidTransition {
                from: from.as_str().to_string(),
                action: "resume".to_string(),
            }),
        }
    }

    /// Running | Paused -> Finished. The snapshot is retained until
    /// submission succeeds; a repeat call while already finished is the
    /// submit-retry path and is accepted.
    pub fn mark_finished(&mut self, now_ms: i64) -> Result<()> {
        match self.status() {
            SessionStatus::Running | SessionStatus::Paused => {
                self.generation += 1;
                if let Some(state) = self.state.as_mut() {
                    state.status = SessionStatus::Finished;
                }
                info!("traq: [Session] Finished");
                self.persist(now_ms);
                Ok(())
            }
            SessionStatus::Finished => Ok(()),
            SessionStatus::Idle => Err(TrackerError::NoSession),
        }
    }

    /// Discard all accumulated data and delete the snapshot. Legal from any
    /// state; used by abandon and by successful submission.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = None;
        if let Err(e) = self.store.delete() {
            warn!("traq: [Session] Snapshot delete failed: {}", e);
        }
    }

    // ========================================================================
    // Producers
    // ========================================================================

    /// One second of clock. Dropped silently unless the session is running
    /// and the producer's generation is current.
    pub fn tick(&mut self, generation: u64, now_ms: i64) {
        if generation != self.generation || self.status() != SessionStatus::Running {
            return;
        }
        if let Some(state) = self.state.as_mut() {
            state.elapsed_seconds += 1;
        }
        self.persist(now_ms);
    }

    /// One delivered fix. Dropped silently unless running; malformed fixes
    /// are logged and dropped (a bad read must not kill tracking).
    pub fn ingest_fix(&mut self, fix: &GeoFix, now_ms: i64) {
        if self.status() != SessionStatus::Running {
            debug!("traq: [Session] Fix dropped, not running");
            return;
        }
        if !fix.is_valid() {
            warn!(
                "traq: [Session] Malformed fix dropped ({}, {})",
                fix.latitude, fix.longitude
            );
            return;
        }

        let Some(state) = self.state.as_mut() else {
            return;
        };
        let candidate = fix.point();
        match assess(&self.filter, state.path.last(), &candidate, fix.accuracy_m) {
            FixDecision::First => {
                state.path.push(candidate);
                self.persist(now_ms);
            }
            FixDecision::Advance { meters } => {
                state.path.push(candidate);
                state.distance_meters += meters;
                self.persist(now_ms);
            }
            FixDecision::RejectedAccuracy => {
                debug!(
                    "traq: [Session] Fix rejected, accuracy {:.0} m",
                    fix.accuracy_m
                );
            }
            FixDecision::RejectedJitter => {
                debug!("traq: [Session] Fix rejected as jitter");
            }
        }
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    /// Load the durable snapshot after a process restart.
    ///
    /// A `Running` snapshot has the wall-clock gap since its last persist
    /// added to `elapsed_seconds` (clamped at zero against clock skew), so
    /// time spent killed or suspended is neither lost nor double-counted.
    /// Paused sessions add nothing. A `Finished` snapshot is surfaced so the
    /// caller can retry submission. Returns the recovered status, or `None`
    /// when there is nothing to recover.
    pub fn recover(&mut self, now_ms: i64) -> Option<SessionStatus> {
        let snapshot = match self.store.read() {
            Ok(s) => s,
            Err(e) => {
                warn!("traq: [Session] Snapshot read failed, starting idle: {}", e);
                // Drop the unreadable row so the next launch does not trip on
                // it again
                if let Err(e) = self.store.delete() {
                    warn!("traq: [Session] Snapshot delete failed: {}", e);
                }
                None
            }
        };
        let mut state = snapshot?;

        match state.status {
            SessionStatus::Idle => {
                // An idle snapshot should never have been written; drop it
                warn!("traq: [Session] Discarding idle snapshot");
                if let Err(e) = self.store.delete() {
                    warn!("traq: [Session] Snapshot delete failed: {}", e);
                }
                None
            }
            SessionStatus::Running => {
                let gap_seconds = ((now_ms - state.last_persisted_at_ms) / 1000).max(0) as u64;
                state.elapsed_seconds += gap_seconds;
                info!(
                    "traq: [Session] Recovered running '{}', reconciled {} s gap",
                    state.activity_id, gap_seconds
                );
                self.generation += 1;
                self.state = Some(state);
                self.persist(now_ms);
                Some(SessionStatus::Running)
            }
            status @ (SessionStatus::Paused | SessionStatus::Finished) => {
                info!(
                    "traq: [Session] Recovered {} '{}'",
                    status.as_str(),
                    state.activity_id
                );
                self.generation += 1;
                self.state = Some(state);
                Some(status)
            }
        }
    }

    /// Write the snapshot for the current state. Failures are absorbed:
    /// losing crash-resilience for one interval beats halting the session.
    fn persist(&mut self, now_ms: i64) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.last_persisted_at_ms = now_ms;
        if let Err(e) = self.store.write(state) {
            warn!("traq: [Session] Snapshot write failed: {}", e);
        }
    }
}
