#![forbid(unsafe_code)]

//! Host-driven time and scheduled continuations.
//!
//! Layout runs on a single cooperative event loop. Work that must happen
//! "later" (for example after a collapse animation has settled) is queued on
//! a [`Timeline`] and released when the host advances the clock. No threads,
//! no blocking, and fully deterministic under test.

use std::collections::BTreeMap;
use std::time::Duration;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Handle to a scheduled continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A queue of continuations ordered by deadline.
///
/// Entries with equal deadlines fire in the order they were scheduled.
#[derive(Debug)]
pub struct Timeline<T> {
    clock: DeterministicClock,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            clock: DeterministicClock::new(),
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }
}

impl<T> Timeline<T> {
    /// Create an empty timeline at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time on the timeline's clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Queue `payload` to become due `delay` from now.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.clock.now().saturating_add(delay);
        let _ = self.queue.insert((due, seq), payload);
        TimerId(seq)
    }

    /// Advance the clock by `dt` and drain every continuation that is now due.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.clock.advance(dt);
        self.drain_due()
    }

    /// Drain continuations due at or before the current time.
    pub fn drain_due(&mut self) -> Vec<T> {
        let now = self.clock.now();
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    /// Deadline of the earliest pending continuation.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Number of continuations not yet due.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
