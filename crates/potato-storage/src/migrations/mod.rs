//! Ordered schema steps. The applied step count lives in `PRAGMA user_version`.

mod v001_snapshots;
mod v002_snapshot_audit;

use potato_core::errors::StorageError;
use rusqlite::Connection;
use tracing::info;

/// Steps in application order; a step's version is its position plus one.
const STEPS: &[&str] = &[
    v001_snapshots::MIGRATION_SQL,
    v002_snapshot_audit::MIGRATION_SQL,
];

pub const LATEST_VERSION: u32 = STEPS.len() as u32;

/// Bring `conn` up to [`LATEST_VERSION`]. Already-applied steps are skipped.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let applied = schema_version(conn)?;
    for (version, sql) in (1..).zip(STEPS) {
        if version <= applied {
            continue;
        }
        let failed = |e: rusqlite::Error| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        };
        conn.execute_batch(sql).map_err(failed)?;
        conn.pragma_update(None, "user_version", version)
            .map_err(failed)?;
        info!(version, "snapshot schema migrated");
    }
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(crate::to_storage_err)
}
