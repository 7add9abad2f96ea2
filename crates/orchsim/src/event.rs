//! Timer queue: the simulator's scheduling primitive.
//!
//! Deferred work is stored as data (`T`) keyed by deadline rather than as
//! closures, so the owner decides when timers fire by pumping the queue
//! against its clock. Timers with the same deadline fire in the order they
//! were scheduled.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Handle returned by [`TimerQueue::schedule`], usable for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Creates a timer id from a raw value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A timer that has come due.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer<T> {
    /// Handle the timer was scheduled under.
    pub id: TimerId,
    /// Deadline in milliseconds.
    pub due_at_ms: u64,
    /// The deferred work.
    pub payload: T,
}

/// Deadline-ordered queue of pending timers.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    timers: BTreeMap<(u64, TimerId), T>,
    deadlines: HashMap<TimerId, u64>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedules `payload` to come due at `due_at_ms`.
    pub fn schedule(&mut self, due_at_ms: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.timers.insert((due_at_ms, id), payload);
        self.deadlines.insert(id, due_at_ms);
        id
    }

    /// Cancels a pending timer, returning its payload if it was still queued.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let due_at_ms = self.deadlines.remove(&id)?;
        self.timers.remove(&(due_at_ms, id))
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Timer<T>> {
        let (&(due_at_ms, id), _) = self.timers.first_key_value()?;
        if due_at_ms > now_ms {
            return None;
        }

        let payload = self.timers.remove(&(due_at_ms, id))?;
        self.deadlines.remove(&id);

        Some(Timer {
            id,
            due_at_ms,
            payload,
        })
    }

    /// Returns the deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.keys().next().map(|&(due_at_ms, _)| due_at_ms)
    }

    /// Returns true if the timer is still pending.
    pub fn contains(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Returns the number of pending timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Drops every pending timer.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.deadlines.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
