//! Error taxonomy: one enum per subsystem, aggregated into [`PotatoError`].

mod assignment_error;
mod config_error;
mod learning_error;
mod storage_error;

pub use assignment_error::AssignmentError;
pub use config_error::ConfigError;
pub use learning_error::LearningError;
pub use storage_error::StorageError;

/// Top-level error for every fallible engine operation.
#[derive(Debug, thiserror::Error)]
pub enum PotatoError {
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("assignment error: {0}")]
    AssignmentError(#[from] AssignmentError),

    #[error("active learning error: {0}")]
    LearningError(#[from] LearningError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("user not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("instance not found: {instance_id}")]
    InstanceNotFound { instance_id: String },

    #[error("campaign saturated: {remaining} labels remaining, new annotators refused")]
    CampaignSaturated { remaining: usize },

    #[error("user {user_id} has an empty queue")]
    EmptyQueue { user_id: String },
}

pub type PotatoResult<T> = Result<T, PotatoError>;
