use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a caller and running solvers.
///
/// Solvers check it between local-search passes and GA generations and then
/// return their best assignment with status `Interrupted`.
///
/// # Examples
///
/// ```
/// use eco_routing::solver::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// The shared flag, for runners that poll an `AtomicBool` directly.
    pub(crate) fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_follows_token() {
        let token = CancellationToken::new();
        let flag = token.flag();
        assert!(!flag.load(Ordering::Relaxed));
        token.clone().cancel();
        assert!(flag.load(Ordering::Relaxed));
    }
}
