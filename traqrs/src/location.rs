//! Location source adapter.
//!
//! The host platform (iOS/Android/web shell) implements [`LocationSource`]
//! over its native location API and hands fixes back through a [`FixRelay`].
//! The relay is the single entry point from the sensor callback world into
//! the serialized session engine: fixes delivered while no session is running
//! are silently dropped, so a stream racing a cancellation can never mutate
//! state after the fact.

use std::sync::{Mutex, Weak};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tracemeter::GeoPoint;

use crate::now_ms;
use crate::session::SessionEngine;

/// A single reported device position.
///
/// Ephemeral: only the accepted effect (a path point) is retained.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported horizontal accuracy in meters (lower is better).
    pub accuracy_m: f64,
    /// Capture time as Unix epoch milliseconds.
    pub captured_at_ms: i64,
}

impl GeoFix {
    /// The position component of the fix.
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Check the fix carries usable values.
    pub fn is_valid(&self) -> bool {
        self.point().is_valid() && self.accuracy_m.is_finite() && self.accuracy_m >= 0.0
    }
}

/// Errors from the location adapter.
#[derive(Debug, Clone, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum LocationError {
    /// The user refused location access. Terminal for tracking; there is no
    /// degraded GPS-less fallback for a GPS activity.
    #[error("location permission denied")]
    PermissionDenied,

    /// The single-shot fix request exceeded its bound. Retryable.
    #[error("no fix within {waited_secs}s")]
    Timeout { waited_secs: u32 },

    /// The platform location service failed for another reason.
    #[error("location unavailable: {message}")]
    Unavailable { message: String },
}

// A foreign implementation that panics or throws something unexpected
// surfaces as an adapter failure rather than poisoning the engine.
impl From<uniffi::UnexpectedUniFFICallbackError> for LocationError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        LocationError::Unavailable { message: e.reason }
    }
}

/// Host-implemented location adapter.
///
/// Implementations must request permission on demand (a no-op on hosts
/// without an explicit permission model), deliver high-accuracy fixes, and
/// never serve a cached fix for `current_fix`.
#[uniffi::export(with_foreign)]
pub trait LocationSource: Send + Sync {
    /// Request a single fresh high-accuracy fix, waiting at most
    /// `timeout_secs` seconds.
    fn current_fix(&self, timeout_secs: u32) -> Result<GeoFix, LocationError>;

    /// Begin a continuous high-accuracy stream, delivering each fix to
    /// `relay.report` and transient read errors to `relay.report_error`.
    /// Returns an opaque handle for `close_stream`. Permission denial
    /// surfaces here as an error.
    fn open_stream(&self, relay: std::sync::Arc<FixRelay>) -> Result<u64, LocationError>;

    /// Stop a stream. Idempotent: unknown or already-closed handles are
    /// no-ops.
    fn close_stream(&self, handle: u64);
}

/// Rust-side receiver for stream callbacks.
///
/// Routes fixes into the engine's serialized mutation entry point. Holds the
/// engine weakly so a leaked foreign stream cannot keep the engine alive.
#[derive(uniffi::Object)]
pub struct FixRelay {
    engine: Weak<Mutex<SessionEngine>>,
}

impl FixRelay {
    pub(crate) fn new(engine: Weak<Mutex<SessionEngine>>) -> Self {
        Self { engine }
    }
}

#[uniffi::export]
impl FixRelay {
    /// Deliver one fix from the stream. Fixes arriving while the session is
    /// not running are dropped inside the engine's status check.
    pub fn report(&self, fix: GeoFix) {
        let Some(engine) = self.engine.upgrade() else {
            debug!("traq: [FixRelay] Fix dropped, engine gone");
            return;
        };
        let Ok(mut guard) = engine.lock() else {
            warn!("traq: [FixRelay] Fix dropped, engine lock poisoned");
            return;
        };
        guard.ingest_fix(&fix, now_ms());
    }

    /// Report a transient stream read error. Logged and dropped; a single
    /// bad read must not kill tracking.
    pub fn report_error(&self, message: String) {
        warn!("traq: [FixRelay] Stream read error: {}", message);
    }
}
