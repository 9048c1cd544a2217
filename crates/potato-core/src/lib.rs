//! # potato-core
//!
//! Foundation crate for the Potato annotation engine.
//! Defines the shared models, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::PotatoConfig;
pub use errors::{PotatoError, PotatoResult};
pub use models::{
    AnnotationSchema, ConsentStatus, Instance, InstanceKind, LabelAnnotation, PrestudyStatus,
    ResolvedValue, SchemaType, SpanAnnotation,
};
