/// Snapshot persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("snapshot {key} is corrupted: {message}")]
    SnapshotCorrupted { key: String, message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}
