//! # potato-assignment
//!
//! The task assignment registry (who still needs what, who has seen what)
//! and the pure sampling policies that pick a batch for one annotator.

pub mod pool;
pub mod registry;
pub mod sampler;

pub use pool::UnassignedPool;
pub use registry::{RegistryState, TaskAssignmentRegistry};
pub use sampler::{inject_test_questions, sample, sample_ordered, sample_random};
