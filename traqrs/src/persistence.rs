//! Durable session snapshots.
//!
//! The live session is written in full to a single well-known key after
//! every accepted mutation, so a crash never loses more than the interval
//! between two consecutive mutation events. Only one live session exists at
//! a time; writes are last-write-wins.
//!
//! Write failures are absorbed by the engine (logged, tracking continues
//! in-memory); read failures at recovery degrade to "no snapshot".

use std::sync::{Arc, Mutex};

use log::warn;
use rusqlite::{Connection, OptionalExtension, params};
use tracemeter::GeoPoint;

use crate::error::{Result, TrackerError};
use crate::session::{SessionState, SessionStatus};

/// The single well-known snapshot key.
pub const SNAPSHOT_KEY: &str = "live_session";

/// Durable store for the live session snapshot.
pub trait SnapshotStore: Send {
    /// Read the snapshot, if one exists.
    fn read(&self) -> Result<Option<SessionState>>;
    /// Write the snapshot, replacing any previous one.
    fn write(&mut self, state: &SessionState) -> Result<()>;
    /// Delete the snapshot. A missing snapshot is not an error.
    fn delete(&mut self) -> Result<()>;
}

// ============================================================================
// SQLite store
// ============================================================================

/// SQLite-backed snapshot store.
///
/// One row keyed by [`SNAPSHOT_KEY`]; the path is a postcard-encoded BLOB,
/// scalar fields are columns. Schema is versioned via `PRAGMA user_version`.
pub struct SqliteSnapshotStore {
    db: Connection,
}

impl SqliteSnapshotStore {
    /// Open (or create) the store at the given database path.
    pub fn new(db_path: &str) -> Result<Self> {
        let db = Connection::open(db_path).map_err(TrackerError::persistence)?;
        Self::init_schema(&db)?;
        Ok(Self { db })
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            -- Live session snapshot (single row, last-write-wins)
            CREATE TABLE IF NOT EXISTS live_session (
                key TEXT PRIMARY KEY,
                activity_id TEXT NOT NULL,
                status TEXT NOT NULL,
                elapsed_seconds INTEGER NOT NULL,
                distance_meters REAL NOT NULL,
                met_coefficient REAL NOT NULL,
                body_mass_kg REAL NOT NULL,
                supports_gps INTEGER NOT NULL,
                started_at_ms INTEGER NOT NULL,
                last_persisted_at_ms INTEGER NOT NULL,
                path BLOB NOT NULL,
                point_count INTEGER NOT NULL
            );

            PRAGMA user_version = 1;
        "#,
        )
        .map_err(TrackerError::persistence)?;
        Ok(())
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn read(&self) -> Result<Option<SessionState>> {
        let row = self
            .db
            .query_row(
                "SELECT activity_id, status, elapsed_seconds, distance_meters,
                        met_coefficient, body_mass_kg, supports_gps,
                        started_at_ms, last_persisted_at_ms, path
                 FROM live_session WHERE key = ?1",
                params![SNAPSHOT_KEY],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u64>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, f64>(4)?,
                        row.get::<_, f64>(5)?,
                        row.get::<_, bool>(6)?,
                        row.get::<_, i64>(7)?,
                        row.get::<_, i64>(8)?,
                        row.get::<_, Vec<u8>>(9)?,
                    ))
                },
            )
            .optional()
            .map_err(TrackerError::persistence)?;

        let Some((
            activity_id,
            status,
            elapsed_seconds,
            distance_meters,
            met_coefficient,
            body_mass_kg,
            supports_gps,
            started_at_ms,
            last_persisted_at_ms,
            path_blob,
        )) = row
        else {
            return Ok(None);
        };

        let status = SessionStatus::parse(&status).ok_or_else(|| TrackerError::Persistence {
            message: format!("unrecognized session status '{}'", status),
        })?;
        let path: Vec<GeoPoint> =
            postcard::from_bytes(&path_blob).map_err(TrackerError::persistence)?;

        Ok(Some(SessionState {
            activity_id,
            status,
            elapsed_seconds,
            distance_meters,
            met_coefficient,
            body_mass_kg,
            supports_gps,
            started_at_ms,
            last_persisted_at_ms,
            path,
        }))
    }

    fn write(&mut self, state: &SessionState) -> Result<()> {
        let path_blob = postcard::to_allocvec(&state.path).map_err(TrackerError::persistence)?;
        self.db
            .execute(
                "INSERT OR REPLACE INTO live_session
                 (key, activity_id, status, elapsed_seconds, distance_meters,
                  met_coefficient, body_mass_kg, supports_gps,
                  started_at_ms, last_persisted_at_ms, path, point_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    SNAPSHOT_KEY,
                    state.activity_id,
                    state.status.as_str(),
                    state.elapsed_seconds,
                    state.distance_meters,
                    state.met_coefficient,
                    state.body_mass_kg,
                    state.supports_gps,
                    state.started_at_ms,
                    state.last_persisted_at_ms,
                    path_blob,
                    state.path.len() as u32,
                ],
            )
            .map_err(TrackerError::persistence)?;
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        self.db
            .execute(
                "DELETE FROM live_session WHERE key = ?1",
                params![SNAPSHOT_KEY],
            )
            .map_err(TrackerError::persistence)?;
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory snapshot store with a shared handle, so tests can inspect what
/// the engine persisted after each mutation.
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<Mutex<Option<SessionState>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently written snapshot.
    pub fn snapshot(&self) -> Option<SessionState> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self) -> Result<Option<SessionState>> {
        Ok(self.snapshot())
    }

    fn write(&mut self, state: &SessionState) -> Result<()> {
        match self.inner.lock() {
            Ok(mut guard) => {
                *guard = Some(state.clone());
                Ok(())
            }
            Err(e) => {
                warn!("traq: [SnapshotStore] Memory store lock poisoned: {}", e);
                Err(TrackerError::persistence(e))
            }
        }
    }

    fn delete(&mut self) -> Result<()> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
        Ok(())
    }
}
