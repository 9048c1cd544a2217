//! # potato-learning
//!
//! Active learning for the annotation queue. Labels collected so far are
//! resolved into one training label per instance, a small text classifier
//! is trained per schema, and the unlabeled remainder is re-ranked so the
//! least confident predictions come first, interleaved with a random share.

pub mod cancellation;
pub mod classifier;
pub mod coordinator;
pub mod plan;
pub mod resolution;
pub mod vectorizer;

pub use cancellation::{Cancellable, CancellationToken};
pub use classifier::{build_pipeline, MultinomialNaiveBayes, NearestCentroid, TextPipeline};
pub use coordinator::{apply_plan, ActiveLearningCoordinator};
pub use plan::{interleave, PassReport, ReorderPlan, Selection, UserFailure};
pub use resolution::resolve_annotations;
pub use vectorizer::{tokenize, CountVectorizer, HashingTfidfVectorizer};
