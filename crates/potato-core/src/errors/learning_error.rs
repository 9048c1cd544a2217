/// Active learning errors.
#[derive(Debug, thiserror::Error)]
pub enum LearningError {
    #[error("schema {schema} has {distinct} distinct labels, need at least 2")]
    InsufficientLabels { schema: String, distinct: usize },

    #[error("training failed for schema {schema}: {reason}")]
    TrainingFailed { schema: String, reason: String },

    #[error("active learning pass cancelled")]
    Cancelled,

    #[error("active learning pass already in progress")]
    AlreadyRunning,

    #[error("reorder for {user_id} produced {actual} ids, expected {expected}")]
    ReorderLengthMismatch {
        user_id: String,
        expected: usize,
        actual: usize,
    },
}
