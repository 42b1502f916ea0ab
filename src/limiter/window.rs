use std::{collections::VecDeque, time::Duration};

use tokio::time::Instant;

/// Timestamps of admitted calls, oldest first.
///
/// Covers the half-open interval `(now - window, now]`: an entry exactly `window` old has
/// expired.
#[derive(Debug)]
pub(crate) struct CallHistory {
    window: Duration,
    admitted: VecDeque<Instant>,
}

impl CallHistory {
    pub(crate) fn new(window: Duration) -> Self {
        debug_assert!(!window.is_zero());
        Self {
            window,
            admitted: VecDeque::new(),
        }
    }

    pub(crate) fn window(&self) -> Duration {
        self.window
    }

    /// Drop every entry which has left the window ending at `now`.
    pub(crate) fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.admitted.front() {
            if now.saturating_duration_since(oldest) < self.window {
                break;
            }
            self.admitted.pop_front();
        }
    }

    /// Number of admissions within the window, as of the last prune.
    pub(crate) fn len(&self) -> usize {
        self.admitted.len()
    }

    /// Record an admission if fewer than `max` are within the window ending at `now`.
    pub(crate) fn try_admit(&mut self, now: Instant, max: usize) -> bool {
        self.prune(now);
        if self.admitted.len() >= max {
            return false;
        }
        self.admitted.push_back(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::CallHistory;

    #[test]
    fn prunes_only_expired_entries() {
        let start = Instant::now();
        let mut history = CallHistory::new(Duration::from_millis(100));

        assert!(history.try_admit(start, 10));
        assert!(history.try_admit(start + Duration::from_millis(40), 10));
        assert!(history.try_admit(start + Duration::from_millis(80), 10));

        history.prune(start + Duration::from_millis(99));
        assert_eq!(history.len(), 3);

        history.prune(start + Duration::from_millis(100));
        assert_eq!(history.len(), 2, "entry exactly one window old has expired");

        history.prune(start + Duration::from_millis(200));
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn rejected_calls_are_not_recorded() {
        let start = Instant::now();
        let mut history = CallHistory::new(Duration::from_millis(100));

        assert!(history.try_admit(start, 1));
        assert!(!history.try_admit(start + Duration::from_millis(50), 1));
        assert_eq!(history.len(), 1);

        // The rejection at +50ms doesn't hold the window open.
        assert!(history.try_admit(start + Duration::from_millis(100), 1));
    }

    #[test]
    fn zero_max_admits_nothing() {
        let mut history = CallHistory::new(Duration::from_secs(1));

        assert!(!history.try_admit(Instant::now(), 0));
        assert_eq!(history.len(), 0);
    }
}
