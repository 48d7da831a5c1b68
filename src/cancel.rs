use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Cooperative cancellation signal shared between a caller and long-running work.
///
/// Clones observe the same flag. Work polls [`CancellationToken::check`] at its
/// own boundaries (once per gap for interpolation, once per row for exports);
/// nothing is interrupted mid-step.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a token sharing this flag that additionally expires after `timeout`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns a token sharing this flag that additionally expires at `deadline`.
    ///
    /// An earlier deadline already carried by `self` wins.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = self
            .deadline
            .map_or(deadline, |existing| existing.min(deadline));
        Self {
            flag: Arc::clone(&self.flag),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fails with [`Error::Cancelled`] once the token has fired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if [`cancel`](Self::cancel) was called on any
    /// clone or the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(observer.check().is_ok());
        token.cancel();
        assert!(matches!(observer.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn elapsed_deadline_cancels_without_touching_parent() {
        let parent = CancellationToken::new();
        let child = parent.with_deadline(Instant::now());
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn parent_cancel_reaches_timed_child() {
        let parent = CancellationToken::new();
        let child = parent.with_timeout(Duration::from_secs(3600));
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
