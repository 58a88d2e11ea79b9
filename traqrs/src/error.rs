//! Unified error handling for the tracking engine.
//!
//! Sensor-level and persistence-level failures are absorbed where they occur
//! (logged, session continues); only permission and submission failures are
//! surfaced to the caller as user-facing errors.

use crate::location::LocationError;

/// Unified error type for tracker operations.
#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum TrackerError {
    /// Location adapter failure. Permission denial is terminal for tracking;
    /// a single-shot fix timeout is retryable by the caller.
    #[error(transparent)]
    Location {
        #[from]
        source: LocationError,
    },

    /// The activity catalog has no definition for the requested id.
    /// Starting a session for an unknown activity is a fatal precondition.
    #[error("unknown activity '{activity_id}'")]
    UnknownActivity { activity_id: String },

    /// A live session already exists; only one may run at a time.
    #[error("a session is already active")]
    SessionActive,

    /// No live session exists for the requested operation.
    #[error("no active session")]
    NoSession,

    /// The requested transition is not legal from the current status.
    #[error("cannot {action} from {from} state")]
    InvalidTransition { from: String, action: String },

    /// Snapshot store failure. Absorbed mid-session (tracking continues
    /// in-memory); surfaced only from store open and recovery.
    #[error("persistence error: {message}")]
    Persistence { message: String },

    /// The workout sink rejected the finalized payload. The snapshot is
    /// retained so finalization can be retried without data loss.
    #[error("submission failed: {message}")]
    Submission { message: String },

    /// The global tracker has not been initialized.
    #[error("tracker not initialized")]
    NotInitialized,
}

// Unexpected exceptions from foreign sink implementations surface as failed
// submissions, which keeps the finished session retryable.
impl From<uniffi::UnexpectedUniFFICallbackError> for TrackerError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        TrackerError::Submission { message: e.reason }
    }
}

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

impl TrackerError {
    /// Wrap a storage-layer error message.
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        TrackerError::Persistence {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::UnknownActivity {
            activity_id: "yoga".to_string(),
        };
        assert!(err.to_string().contains("yoga"));

        let err = TrackerError::InvalidTransition {
            from: "finished".to_string(),
            action: "pause".to_string(),
        };
        assert_eq!(err.to_string(), "cannot pause from finished state");
    }

    #[test]
    fn test_location_error_converts() {
        let err: TrackerError = LocationError::PermissionDenied.into();
        assert!(matches!(err, TrackerError::Location { .. }));
        assert!(err.to_string().contains("permission"));
    }
}
