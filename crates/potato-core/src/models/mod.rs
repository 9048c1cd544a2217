//! Shared domain models.

mod annotation;
mod instance;
mod schema;
mod status;

pub use annotation::{
    behavior_from_form, BehaviorData, LabelAnnotation, ResolvedValue, SchemaAnnotation,
    SpanAnnotation,
};
pub use instance::{Instance, InstanceKind};
pub use schema::{AnnotationSchema, LabelSpec, LabelSuggestions, SchemaType};
pub use status::{ConsentStatus, PrestudyStatus};
