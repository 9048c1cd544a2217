//! Seams between the engine and its pluggable collaborators.

mod classifier;
mod snapshot_store;

pub use classifier::{IClassifier, IVectorizer};
pub use snapshot_store::ISnapshotStore;
