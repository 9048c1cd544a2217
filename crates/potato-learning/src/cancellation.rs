//! Stop flag shared between a learning pass and whoever started it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use potato_core::errors::LearningError;

/// Polled by passes between stages; a pass never blocks on it.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;
    fn cancel(&self);

    /// `Err(Cancelled)` once a stop was requested.
    fn checkpoint(&self) -> Result<(), LearningError> {
        if self.is_cancelled() {
            Err(LearningError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Clones observe the same flag, so a caller can keep one half and pass
/// the other into [`crate::ActiveLearningCoordinator::run_pass`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }
}
