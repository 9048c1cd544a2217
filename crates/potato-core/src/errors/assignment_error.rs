/// Task assignment registry and sampler errors.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("instance {instance_id} has no remaining quota")]
    NotFound { instance_id: String },

    #[error("instance {instance_id} is not assigned to {user_id}")]
    NotAssigned { instance_id: String, user_id: String },

    #[error("insufficient test question pool: requested {requested}, available {available}")]
    InsufficientPool { requested: usize, available: usize },
}
