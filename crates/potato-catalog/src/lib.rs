//! # potato-catalog
//!
//! Immutable-after-load mapping of instance id to payload, assembled from
//! input files plus synthetic pages and expanded test questions.

pub mod builder;
pub mod catalog;
pub mod display;
pub mod loader;
pub mod test_questions;

pub use builder::CatalogBuilder;
pub use catalog::InstanceCatalog;
