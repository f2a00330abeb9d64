//! Timer-backed coalescing primitives.
//!
//! Neither type owns a timer. Callers feed them the current instant and
//! schedule the next poll from [`Throttle::deadline`] /
//! [`Debounce::deadline`].

use std::time::{Duration, Instant};

/// Emits at most one value per interval, keeping only the latest value
/// offered while the window is closed.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    /// Offer a value. Returns it immediately when the window is open,
    /// otherwise parks it, replacing any earlier parked value.
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        if self.is_window_open(now) {
            self.last_emit = Some(now);
            self.pending = None;
            return Some(value);
        }

        self.pending = Some(value);
        None
    }

    /// Release the parked value once its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() || !self.is_window_open(now) {
            return None;
        }

        self.last_emit = Some(now);
        self.pending.take()
    }

    /// Instant at which a parked value becomes releasable.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        self.last_emit.map(|last| last + self.interval)
    }

    fn is_window_open(&self, now: Instant) -> bool {
        match self.last_emit {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }
}

/// Fires once after `delay` of quiescence; every touch restarts the wait.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns `true` exactly once per quiet period.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            },
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
