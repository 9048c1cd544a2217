//! # potato-agreement
//!
//! Inter-annotator agreement. Label tables of several annotators are turned
//! into units of comparable values per schema and scored with Krippendorff's
//! alpha: nominal for radio, interval for likert, and one binary nominal
//! alpha per label for multiselect.

pub mod alpha;
pub mod engine;
pub mod value;

pub use alpha::{krippendorff_alpha, Metric};
pub use engine::{agreement, RaterLabels};
pub use value::{overall_average, AgreementValue, OverallAgreement};
