//! # potato-session
//!
//! Everything owned by one annotator: the ordered queue and its cursor,
//! recorded labels and spans, the consent and prestudy gates, and the
//! concurrent map holding every annotator's state.

pub mod flow;
pub mod gates;
pub mod manager;
pub mod queue;
pub mod state;
pub mod statistics;

pub use flow::{assign_instances, evaluate_prestudy, initial_queue, resolve_prestudy};
pub use gates::{GateEvent, Gates};
pub use manager::UserStateManager;
pub use queue::InstanceQueue;
pub use state::{AnnotationUpdate, UserAnnotationState, UserPhase};
pub use statistics::{parse_time_string, CampaignStatistics, UserStatistics};
