//! SqliteSnapshotStore: snapshots in SQLite behind one serialized writer.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use potato_core::errors::{PotatoResult, StorageError};
use potato_core::traits::ISnapshotStore;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::connection::{open_database, open_in_memory_database};
use crate::to_storage_err;

pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteSnapshotStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = open_database(path)?;
        debug!(path = %path.display(), "opened snapshot database");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            conn: Mutex::new(open_in_memory_database()?),
            path: None,
        })
    }

    /// Database file, `None` in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` with the serialized connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.conn.lock().map_err(|_| StorageError::SqliteError {
            message: "connection lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Number of snapshot writes and deletions recorded for `subject`.
    pub fn log_count(&self, subject: &str) -> Result<usize, StorageError> {
        self.with_conn(|conn| {
            let n: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM snapshot_log WHERE subject = ?1",
                    params![subject],
                    |row| row.get(0),
                )
                .map_err(to_storage_err)?;
            Ok(n as usize)
        })
    }
}

fn log_operation(conn: &Connection, subject: &str, operation: &str, now: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO snapshot_log (subject, operation, recorded_at) VALUES (?1, ?2, ?3)",
        params![subject, operation, now],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

const REGISTRY_SUBJECT: &str = "registry";

impl ISnapshotStore for SqliteSnapshotStore {
    fn save_user(&self, user_id: &str, blob: &str) -> PotatoResult<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_states (user_id, state_json, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET state_json = excluded.state_json,
                                                    updated_at = excluded.updated_at",
                params![user_id, blob, now],
            )
            .map_err(to_storage_err)?;
            log_operation(conn, user_id, "save", &now)
        })?;
        Ok(())
    }

    fn load_user(&self, user_id: &str) -> PotatoResult<Option<String>> {
        let blob = self.with_conn(|conn| {
            conn.query_row(
                "SELECT state_json FROM user_states WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(to_storage_err)
        })?;
        Ok(blob)
    }

    fn list_users(&self) -> PotatoResult<Vec<String>> {
        let ids = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT user_id FROM user_states ORDER BY user_id")
                .map_err(to_storage_err)?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(to_storage_err)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
        })?;
        Ok(ids)
    }

    fn delete_user(&self, user_id: &str) -> PotatoResult<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute("DELETE FROM user_states WHERE user_id = ?1", params![user_id])
                .map_err(to_storage_err)?;
            log_operation(conn, user_id, "delete", &now)
        })?;
        Ok(())
    }

    fn save_registry(&self, blob: &str) -> PotatoResult<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO registry_snapshot (id, state_json, updated_at) VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET state_json = excluded.state_json,
                                               updated_at = excluded.updated_at",
                params![blob, now],
            )
            .map_err(to_storage_err)?;
            log_operation(conn, REGISTRY_SUBJECT, "save", &now)
        })?;
        Ok(())
    }

    fn load_registry(&self) -> PotatoResult<Option<String>> {
        let blob = self.with_conn(|conn| {
            conn.query_row("SELECT state_json FROM registry_snapshot WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(to_storage_err)
        })?;
        Ok(blob)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
