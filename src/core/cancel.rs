//! Cooperative cancellation
//!
//! The engine has no preemption; components check a shared token at safe
//! points (before each cursor pull, before each mutation chunk) and stop
//! cleanly when it is set. Cancellation is not an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag
///
/// Cloning is cheap; all clones observe the same flag. Once cancelled, a
/// token stays cancelled for its lifetime.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, un-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
