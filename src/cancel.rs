// One-shot cancellation switch shared between the caller and the write loop

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Created fresh for each run and never reset; clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
