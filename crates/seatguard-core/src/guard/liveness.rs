use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Tracks whether the surface that started an evaluation is still shown.
///
/// Clones share the flag. Once torn down, results of the evaluation are
/// dropped instead of applied.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    /// A flag for a surface that has just been mounted.
    pub fn mounted() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn tear_down(&self) {
        self.0.store(false, Ordering::Release);
    }
}
