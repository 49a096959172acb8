//! Search control: stop flag and wall-clock budget.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::SearchError;

/// Nodes between clock reads.
const POLL_INTERVAL: u64 = 1024;

/// Decides when a running search must abort.
///
/// The stop flag is checked on every call; the clock only every
/// [`POLL_INTERVAL`] nodes, or on demand via [`check_now`](Self::check_now).
/// Once the budget is exceeded the flag is raised so later checks are cheap.
#[derive(Debug)]
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Instant,
    budget: Option<Duration>,
}

impl SearchControl {
    /// Control with a fresh stop flag. `None` means no time limit.
    pub fn new(budget: Option<Duration>) -> Self {
        Self::with_stop_flag(budget, Arc::new(AtomicBool::new(false)))
    }

    /// Control sharing `stopped` with another thread.
    pub fn with_stop_flag(budget: Option<Duration>, stopped: Arc<AtomicBool>) -> Self {
        Self {
            stopped,
            start: Instant::now(),
            budget,
        }
    }

    /// Abort check for the node counter `nodes`.
    #[inline]
    pub fn check(&self, nodes: u64) -> Result<(), SearchError> {
        if self.stopped.load(Ordering::Relaxed) {
            return Err(SearchError::Timeout);
        }
        if nodes % POLL_INTERVAL != 0 {
            return Ok(());
        }
        self.check_now()
    }

    /// Abort check that always reads the clock.
    pub fn check_now(&self) -> Result<(), SearchError> {
        if self.stopped.load(Ordering::Relaxed) || self.expired() {
            self.stopped.store(true, Ordering::Relaxed);
            return Err(SearchError::Timeout);
        }
        Ok(())
    }

    /// Whether the budget has run out.
    pub fn expired(&self) -> bool {
        self.budget.is_some_and(|budget| self.start.elapsed() >= budget)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::SearchControl;
    use crate::error::SearchError;

    #[test]
    fn unlimited_never_stops() {
        let control = SearchControl::new(None);
        assert!(control.check(1024).is_ok());
        assert!(control.check_now().is_ok());
        assert!(!control.expired());
    }

    #[test]
    fn zero_budget_stops_at_poll() {
        let control = SearchControl::new(Some(Duration::ZERO));
        // Off-interval node counts skip the clock.
        assert!(control.check(1).is_ok());
        assert!(matches!(control.check(2048), Err(SearchError::Timeout)));
        // The flag is now raised.
        assert!(control.check(1).is_err());
    }

    #[test]
    fn external_flag_stops_immediately() {
        let flag = Arc::new(AtomicBool::new(false));
        let control = SearchControl::with_stop_flag(None, Arc::clone(&flag));
        assert!(control.check(3).is_ok());
        flag.store(true, Ordering::Relaxed);
        assert!(control.check(3).is_err());
    }
}
