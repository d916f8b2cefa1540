use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-way "processing finished" flag shared by every request handler.
///
/// Starts not ready; [`ReadinessGate::mark_ready`] flips it once and it never
/// goes back.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate(Arc<AtomicBool>);

impl ReadinessGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark processing as done. Returns `true` if this call made the transition.
    pub fn mark_ready(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}
