//! Trailing-edge coalescing of edit notifications.
//!
//! Time is passed in explicitly so the debouncer never sleeps: the host asks
//! [`Debouncer::poll`] whether the quiet period has elapsed at a given instant.

use chrono::{DateTime, Local, TimeDelta};

/// A burst of notifications that has gone quiet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    /// The most recent value pushed in the burst
    pub value: T,
    /// Instant at which the burst settled (last push + delay)
    pub at: DateTime<Local>,
    /// Number of notifications collapsed into this one
    pub coalesced: usize,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    last: DateTime<Local>,
    count: usize,
}

/// Collapses rapid notifications into one per pause.
#[derive(Debug)]
pub struct Debouncer<T> {
    /// None when the delay does not fit a `TimeDelta`; such bursts only leave via `flush`
    delay: Option<TimeDelta>,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: i64::try_from(delay_ms)
                .ok()
                .and_then(TimeDelta::try_milliseconds),
            pending: None,
        }
    }

    /// Record a notification at `at`.
    ///
    /// If an earlier burst had already gone quiet by `at`, it is returned so
    /// the caller can act on it before the new notification is considered.
    pub fn push(&mut self, value: T, at: DateTime<Local>) -> Option<Fired<T>> {
        let fired = self.poll(at);
        let count = self.pending.as_ref().map_or(0, |p| p.count);
        self.pending = Some(Pending {
            value,
            last: at,
            count: count + 1,
        });
        fired
    }

    /// Take the pending burst if its quiet period has elapsed by `now`.
    pub fn poll(&mut self, now: DateTime<Local>) -> Option<Fired<T>> {
        let due = self.deadline().is_some_and(|deadline| now >= deadline);
        if due { self.flush() } else { None }
    }

    /// Take the pending burst unconditionally, as if the delay had passed.
    ///
    /// A burst whose deadline is out of range settles at its last push.
    pub fn flush(&mut self) -> Option<Fired<T>> {
        let at = self.deadline();
        self.pending.take().map(|p| Fired {
            at: at.unwrap_or(p.last),
            value: p.value,
            coalesced: p.count,
        })
    }

    /// When the pending burst will fire. None if nothing is pending or the
    /// deadline is out of range.
    pub fn deadline(&self) -> Option<DateTime<Local>> {
        let delay = self.delay?;
        self.pending
            .as_ref()
            .and_then(|p| p.last.checked_add_signed(delay))
    }
}
