//! Connection setup shared by file-backed and in-memory databases.

pub mod pragmas;

use std::path::Path;

use potato_core::errors::StorageError;
use rusqlite::Connection;

use crate::migrations::run_migrations;
use crate::to_storage_err;

/// Open `path`, apply pragmas and bring the schema up to date.
pub fn open_database(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open(path).map_err(to_storage_err)?;
    pragmas::apply_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// In-memory database with the same schema (for tests).
pub fn open_in_memory_database() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory().map_err(to_storage_err)?;
    pragmas::apply_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}
