//! Published read models.
//!
//! The UI layer never touches `SessionState` directly; it reads these
//! value snapshots, so there is exactly one writer to the live session.

use serde::{Deserialize, Serialize};
use tracemeter::{format_distance, format_duration, format_pace};

use crate::session::{SessionState, SessionStatus};

/// Read-only snapshot of the live session for display.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetrics {
    pub status: SessionStatus,
    pub activity_id: String,
    pub elapsed_seconds: u64,
    pub distance_meters: f64,
    pub calories_burned: u32,
    pub point_count: u32,
    pub formatted_distance: String,
    pub formatted_pace: String,
    pub formatted_duration: String,
}

impl LiveMetrics {
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            status: state.status,
            activity_id: state.activity_id.clone(),
            elapsed_seconds: state.elapsed_seconds,
            distance_meters: state.distance_meters,
            calories_burned: state.calories_burned(),
            point_count: state.path.len() as u32,
            formatted_distance: format_distance(state.distance_meters),
            formatted_pace: format_pace(state.elapsed_seconds as f64, state.distance_meters),
            formatted_duration: format_duration(state.elapsed_seconds),
        }
    }
}

/// What was found in the durable store at startup.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum RecoveryOutcome {
    /// No interrupted session; start idle.
    NoSession,
    /// A running session was restored and is ticking again.
    ResumedRunning { metrics: LiveMetrics },
    /// A paused session was restored; it stays paused until the user acts.
    RestoredPaused { metrics: LiveMetrics },
    /// A finished session whose submission never succeeded; call finish to
    /// retry.
    AwaitingSubmit { metrics: LiveMetrics },
}
