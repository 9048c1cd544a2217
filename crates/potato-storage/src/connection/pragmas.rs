//! Connection settings for the snapshot file.

use potato_core::errors::StorageError;
use rusqlite::Connection;

use crate::to_storage_err;

/// Snapshot writes come from request threads; readers must not block them.
const SNAPSHOT_PRAGMAS: &[(&str, &str)] = &[
    ("journal_mode", "WAL"),
    ("synchronous", "NORMAL"),
    ("busy_timeout", "5000"),
    ("foreign_keys", "ON"),
];

pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    let batch: String = SNAPSHOT_PRAGMAS
        .iter()
        .map(|(name, value)| format!("PRAGMA {name} = {value};\n"))
        .collect();
    conn.execute_batch(&batch).map_err(to_storage_err)
}

/// In-memory databases report `memory` and never switch to WAL.
pub fn is_wal(conn: &Connection) -> Result<bool, StorageError> {
    conn.pragma_query_value(None, "journal_mode", |row| row.get::<_, String>(0))
        .map(|mode| mode.eq_ignore_ascii_case("wal"))
        .map_err(to_storage_err)
}
