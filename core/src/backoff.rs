//! Reconnect delay policy.
//!
//! Delays start at `initial`, double after every wait and never exceed
//! `max`. A session that reached the connected state resets the delay to
//! `initial`. Once deactivated the policy yields no further delays.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    current: Duration,
    max: Duration,
    active: bool,
}

impl Backoff {
    /// `max` is raised to `initial` if it is smaller.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            current: initial,
            max: max.max(initial),
            active: true,
        }
    }

    /// Delay to wait before the next attempt, or `None` once deactivated.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if !self.active {
            return None;
        }
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current(&self) -> Duration {
        self.current
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(120))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(delays: &[u64]) -> Vec<Duration> {
        delays.iter().copied().map(Duration::from_secs).collect()
    }

    #[test]
    fn doubles_up_to_cap() {
        let mut backoff = Backoff::default();
        let delays: Vec<_> = (0..10).map(|_| backoff.next_delay().unwrap()).collect();
        assert_eq!(delays, secs(&[1, 2, 4, 8, 16, 32, 64, 120, 120, 120]));
    }

    #[test]
    fn never_decreases_without_reset() {
        let mut backoff = Backoff::new(Duration::from_millis(300), Duration::from_secs(5));
        let mut last = Duration::ZERO;
        for _ in 0..20 {
            let delay = backoff.next_delay().unwrap();
            assert!(delay >= last);
            assert!(delay <= Duration::from_secs(5));
            last = delay;
        }
    }

    #[test]
    fn reset_restarts_from_initial() {
        let mut backoff = Backoff::default();
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.current(), Duration::from_secs(4));
        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn inactive_yields_nothing() {
        let mut backoff = Backoff::default();
        backoff.deactivate();
        assert!(!backoff.is_active());
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn max_below_initial_is_raised() {
        let mut backoff = Backoff::new(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(3)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(3)));
    }
}
