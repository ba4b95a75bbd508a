//! Edit-burst debouncing with an explicit clock.
//!
//! The caller passes the current [`Instant`] into every method, so the
//! debouncer itself never sleeps or reads the time and tests can drive it
//! deterministically.

use std::time::{Duration, Instant};

/// Tracks whether a burst of changes has gone quiet for `window`.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use uigen_preview::Debouncer;
///
/// let mut debouncer = Debouncer::new(Duration::from_millis(100));
/// let start = Instant::now();
///
/// debouncer.note(start);
/// debouncer.note(start + Duration::from_millis(60));
/// assert!(!debouncer.is_settled(start + Duration::from_millis(120)));
/// assert!(debouncer.is_settled(start + Duration::from_millis(160)));
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    first: Option<Instant>,
    last: Option<Instant>,
}

impl Debouncer {
    /// Creates an idle debouncer.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            first: None,
            last: None,
        }
    }

    /// Returns the quiet period.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Records a change at `now`.
    pub fn note(&mut self, now: Instant) {
        self.first.get_or_insert(now);
        self.last = Some(now);
    }

    /// Returns `true` if changes are waiting.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.last.is_some()
    }

    /// Returns `true` if changes are waiting and none arrived in the last
    /// `window`.
    #[must_use]
    pub fn is_settled(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// Returns when the pending burst settles, assuming no further changes.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.last.map(|last| last + self.window)
    }

    /// Returns when the pending burst started.
    #[must_use]
    pub const fn pending_since(&self) -> Option<Instant> {
        self.first
    }

    /// Forgets pending changes.
    pub const fn reset(&mut self) {
        self.first = None;
        self.last = None;
    }
}
