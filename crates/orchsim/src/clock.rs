//! Time sources for the simulator.
//!
//! - [`SimClock`]: virtual time that only moves when the owner advances it.
//!   Tests and replays use this so timers fire at exact, reproducible instants.
//! - [`SystemClock`]: monotonic wall time since creation. Advancement is a
//!   no-op; timers fire when the owner pumps after enough real time passed.
//!
//! Timestamps are milliseconds since an arbitrary per-clock epoch.

use std::time::Instant;

/// Trait for time sources (simulation or wall clock).
pub trait Clock {
    /// Returns the current time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Advances time to the given value (virtual clocks only).
    ///
    /// Wall clocks make this a no-op.
    ///
    /// # Panics
    ///
    /// May panic in debug builds if `time_ms < self.now_ms()`.
    fn advance_to(&mut self, time_ms: u64);

    /// Advances the clock by a delta (virtual clocks only).
    #[inline]
    fn advance_by(&mut self, delta_ms: u64) {
        let target = self.now_ms().saturating_add(delta_ms);
        self.advance_to(target);
    }

    /// Returns true if `advance_to` actually moves this clock.
    fn is_virtual(&self) -> bool;
}

// ============================================================================
// Simulation Implementation
// ============================================================================

/// Deterministic clock advanced explicitly by its owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimClock {
    now_ms: u64,
}

impl SimClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self { now_ms: 0 }
    }

    /// Creates a clock starting at the given time.
    pub fn at(now_ms: u64) -> Self {
        Self { now_ms }
    }
}

impl Clock for SimClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn advance_to(&mut self, time_ms: u64) {
        debug_assert!(
            time_ms >= self.now_ms,
            "time cannot go backwards: current={}, target={}",
            self.now_ms,
            time_ms
        );
        self.now_ms = self.now_ms.max(time_ms);
    }

    fn is_virtual(&self) -> bool {
        true
    }
}

// ============================================================================
// Wall Clock Implementation
// ============================================================================

/// Monotonic wall clock anchored at creation.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Creates a clock anchored to the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn advance_to(&mut self, _time_ms: u64) {
        // Real time cannot be advanced.
    }

    fn is_virtual(&self) -> bool {
        false
    }
}
