//! # potato-storage
//!
//! Durable snapshots of annotator state and the assignment registry, plus
//! export of the collected annotations.
//!
//! Snapshots are opaque JSON blobs: the stores never look inside them.

pub mod connection;
pub mod export;
pub mod memory_store;
pub mod migrations;
pub mod sqlite_store;

pub use export::{export_annotations, write_annotations, AnnotationRecord, ExportFormat};
pub use memory_store::InMemorySnapshotStore;
pub use sqlite_store::SqliteSnapshotStore;

use potato_core::errors::StorageError;

pub(crate) fn to_storage_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
