//! Trailing-edge debounce gate for collapsing bursts of requests

use instant::Instant;
use std::time::Duration;

/// Default quiet window before a submission fires
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// An explicit trailing-edge debounce gate
///
/// Each [`Debounce::submit`] overwrites the pending value and re-arms the
/// deadline one quiet window into the future; [`Debounce::poll`] hands the
/// value out only once the window has elapsed with no newer submission. Of N
/// submissions inside one window, exactly the last fires.
///
/// The current time is always passed in by the caller, so the gate is fully
/// deterministic under test. The frame loop polls it with `Instant::now()`.
#[derive(Debug)]
pub struct Debounce<T> {
    window: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debounce<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
        }
    }

    /// Store `value` as the pending submission and re-arm the deadline
    pub fn submit(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.deadline = Some(now + self.window);
    }

    /// Hand out the pending value if the quiet window has elapsed
    ///
    /// Returns `Some` at most once per armed deadline.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Whether a submission is waiting for its window to elapse
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<T> Default for Debounce<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(milliseconds: u64) -> Duration {
        Duration::from_millis(milliseconds)
    }

    #[test]
    fn test_fires_only_after_quiet_window() {
        let mut gate = Debounce::default();
        let t0 = Instant::now();

        gate.submit(1, t0);
        assert!(gate.is_pending());
        assert_eq!(gate.poll(t0), None);
        assert_eq!(gate.poll(t0 + ms(499)), None);
        assert_eq!(gate.poll(t0 + ms(500)), Some(1));
        assert!(!gate.is_pending());
        assert_eq!(gate.poll(t0 + ms(600)), None);
    }

    #[test]
    fn test_last_submission_wins() {
        let mut gate = Debounce::default();
        let t0 = Instant::now();

        // Three submissions 100 ms apart all land inside one quiet window.
        gate.submit(1, t0);
        gate.submit(2, t0 + ms(100));
        gate.submit(3, t0 + ms(200));

        // The window restarts from the last submission.
        assert_eq!(gate.poll(t0 + ms(650)), None);
        assert_eq!(gate.poll(t0 + ms(700)), Some(3));
        assert_eq!(gate.poll(t0 + ms(1500)), None);
    }

    #[test]
    fn test_submission_during_window_re_arms() {
        let mut gate = Debounce::default();
        let t0 = Instant::now();

        gate.submit(1, t0);
        assert_eq!(gate.poll(t0 + ms(499)), None);
        gate.submit(2, t0 + ms(499));
        assert_eq!(gate.poll(t0 + ms(500)), None);
        assert_eq!(gate.poll(t0 + ms(999)), Some(2));
    }

    #[test]
    fn test_independent_windows_fire_independently() {
        let mut gate = Debounce::new(ms(100));
        let t0 = Instant::now();

        gate.submit("first", t0);
        assert_eq!(gate.poll(t0 + ms(100)), Some("first"));

        gate.submit("second", t0 + ms(300));
        assert_eq!(gate.poll(t0 + ms(350)), None);
        assert_eq!(gate.poll(t0 + ms(400)), Some("second"));
    }
}
