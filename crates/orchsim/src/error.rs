//! Error types for the simulator core.

use thiserror::Error;

/// Errors raised by the simulator core.
///
/// Only programmer errors surface here. Timing races (a timer firing after
/// its target was cleared) are defined no-ops, and simulated failures are
/// message statuses, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    /// A bounded integer draw was requested with `max < min`.
    #[error("invalid range: max ({max}) is less than min ({min})")]
    InvalidRange { min: i64, max: i64 },
}
