//! Session finalization.
//!
//! Converts a terminal [`SessionState`] into the payload handed to the
//! workout log sink. The recorded path is embedded twice: a versioned JSON
//! payload that round-trips the ordered point sequence losslessly (the
//! source of truth for later readers), and a polyline-encoded rendering aid
//! for map display only.

use serde::{Deserialize, Serialize};
use tracemeter::{GeoPoint, format_distance, format_duration, format_pace};

use crate::error::{Result, TrackerError};
use crate::session::SessionState;

/// Current version of the embedded route payload format.
pub const ROUTE_PAYLOAD_VERSION: u32 = 1;

/// Versioned, losslessly round-trippable embedding of a session path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePayload {
    pub version: u32,
    pub points: Vec<GeoPoint>,
}

impl RoutePayload {
    pub fn from_path(path: &[GeoPoint]) -> Self {
        Self {
            version: ROUTE_PAYLOAD_VERSION,
            points: path.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(TrackerError::persistence)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(TrackerError::persistence)
    }
}

/// The finalized workout record submitted to the external log.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub activity_id: String,
    /// Finalization time as Unix epoch milliseconds.
    pub recorded_at_ms: i64,
    pub elapsed_seconds: u64,
    pub distance_meters: f64,
    pub calories_burned: u32,
    /// Human-readable summary of distance, duration, and pace.
    pub note: String,
    /// Versioned [`RoutePayload`] as JSON; consumers extract the ordered
    /// point sequence losslessly.
    pub route_json: String,
    /// Polyline-encoded path for map rendering. Display-only; precision is
    /// lossy by design.
    pub route_polyline: String,
}

/// Build the external log payload from a terminal session state.
pub fn build_record(state: &SessionState, now_ms: i64) -> Result<WorkoutRecord> {
    let route_json = RoutePayload::from_path(&state.path).to_json()?;
    let coords = state
        .path
        .iter()
        .map(|p| geo_types::Coord {
            x: p.longitude,
            y: p.latitude,
        });
    let route_polyline =
        polyline::encode_coordinates(coords, 5).map_err(TrackerError::persistence)?;

    let note = format!(
        "{} in {}, avg pace {}",
        format_distance(state.distance_meters),
        format_duration(state.elapsed_seconds),
        format_pace(state.elapsed_seconds as f64, state.distance_meters),
    );

    Ok(WorkoutRecord {
        activity_id: state.activity_id.clone(),
        recorded_at_ms: now_ms,
        elapsed_seconds: state.elapsed_seconds,
        distance_meters: state.distance_meters,
        calories_burned: state.calories_burned(),
        note,
        route_json,
        route_polyline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;

    fn finished_state() -> SessionState {
        SessionState {
            activity_id: "running".to_string(),
            status: SessionStatus::Finished,
            elapsed_seconds: 1800,
            distance_meters: 5000.0,
            met_coefficient: 9.8,
            body_mass_kg: 80.0,
            supports_gps: true,
            started_at_ms: 1_700_000_000_000,
            last_persisted_at_ms: 1_700_001_800_000,
            path: vec![
                GeoPoint::new(51.5074, -0.1278),
                GeoPoint::new(51.5080, -0.1290),
                GeoPoint::new(51.5090, -0.1300),
            ],
        }
    }

    #[test]
    fn test_route_payload_round_trip() {
        let state = finished_state();
        let json = RoutePayload::from_path(&state.path).to_json().unwrap();
        let decoded = RoutePayload::from_json(&json).unwrap();

        assert_eq!(decoded.version, ROUTE_PAYLOAD_VERSION);
        assert_eq!(decoded.points, state.path);
    }

    #[test]
    fn test_record_carries_final_metrics() {
        let record = build_record(&finished_state(), 1_700_001_800_000).unwrap();

        assert_eq!(record.activity_id, "running");
        assert_eq!(record.elapsed_seconds, 1800);
        assert_eq!(record.distance_meters, 5000.0);
        // round(9.8 * 80 * 0.5) = 392
        assert_eq!(record.calories_burned, 392);
    }

    #[test]
    fn test_note_summarizes_session() {
        let record = build_record(&finished_state(), 1_700_001_800_000).unwrap();
        // 5 km in 30 minutes is a 6:00 /km pace
        assert_eq!(record.note, "5.00 km in 30:00, avg pace 6:00 /km");
    }

    #[test]
    fn test_empty_path_produces_empty_route() {
        let state = SessionState {
            path: Vec::new(),
            distance_meters: 0.0,
            ..finished_state()
        };
        let record = build_record(&state, 1_700_001_800_000).unwrap();

        let payload = RoutePayload::from_json(&record.route_json).unwrap();
        assert!(payload.points.is_empty());
        assert!(record.route_polyline.is_empty());
        assert!(record.note.contains("0:00 /km"));
    }

    #[test]
    fn test_route_json_preserves_point_order() {
        let record = build_record(&finished_state(), 0).unwrap();
        let payload = RoutePayload::from_json(&record.route_json).unwrap();
        assert_eq!(payload.points[0], GeoPoint::new(51.5074, -0.1278));
        assert_eq!(payload.points[2], GeoPoint::new(51.5090, -0.1300));
    }
}
