//! Trailing-edge debouncing of scroll and resize events.
//!
//! Time is passed in by the caller, which keeps the debouncer deterministic
//! and lets the event loop drive it from whatever clock it owns.

use std::time::{Duration, Instant};

/// Default debounce delay.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Coalesces bursts of events into one, keeping the latest value.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet period after the last event before it fires.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Record an event; replaces any pending value and restarts the timer.
    pub fn trigger(&mut self, now: Instant, value: T) {
        self.pending = Some((now, value));
    }

    /// Take the pending value once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (at, _) = self.pending.as_ref()?;
        if now.saturating_duration_since(*at) < self.delay {
            return None;
        }
        self.pending.take().map(|(_, value)| value)
    }

    /// When the pending value becomes ready, if any.
    ///
    /// `None` also when the deadline is past the range of `Instant`; such a
    /// value never becomes ready.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .and_then(|(at, _)| at.checked_add(self.delay))
    }

    /// Check if an event is waiting.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending event.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_coalesces_to_latest() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(100));
        d.trigger(t0, 1);
        d.trigger(t0 + ms(40), 2);
        d.trigger(t0 + ms(80), 3);
        assert_eq!(d.poll(t0 + ms(150)), None);
        assert_eq!(d.deadline(), Some(t0 + ms(180)));
        assert_eq!(d.poll(t0 + ms(180)), Some(3));
        assert!(!d.is_pending());
        assert_eq!(d.poll(t0 + ms(500)), None);
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::ZERO);
        d.trigger(t0, "x");
        assert_eq!(d.poll(t0), Some("x"));
    }

    #[test]
    fn test_unbounded_delay_never_fires() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::MAX);
        d.trigger(t0, 1);
        assert!(d.is_pending());
        assert_eq!(d.deadline(), None);
        assert_eq!(d.poll(t0 + Duration::from_secs(86_400)), None);
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut d: Debouncer<u8> = Debouncer::default();
        assert_eq!(d.delay(), DEFAULT_DEBOUNCE);
        d.trigger(t0, 9);
        d.cancel();
        assert_eq!(d.poll(t0 + ms(1_000)), None);
    }
}
