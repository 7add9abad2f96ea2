//! Deterministic random number generation.
//!
//! All randomness in a session flows through one [`SimRng`] owned by the
//! simulator instance. The generator is mulberry32: one 32-bit state word,
//! advanced by a fixed odd increment and mixed with xor-shifts and odd
//! multiplies. The algorithm is fixed bit-for-bit so a seed replays the same
//! trace on any platform and in any port.
//!
//! # Example
//!
//! ```
//! use orchsim::{Rng, SimRng};
//!
//! let mut a = SimRng::new(42);
//! let mut b = SimRng::new(42);
//! assert_eq!(a.next_u32(), b.next_u32());
//! assert!((0.0..1.0).contains(&a.next_f64()));
//! ```

use crate::SimError;

/// Increment applied to the state word on every draw.
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^32 as a float, the divisor mapping a `u32` onto [0, 1).
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Source of randomness for the simulator.
///
/// The simulator is generic over this trait so tests can substitute scripted
/// sources. Use `<R: Rng>` generic parameters; the draw methods sit on the
/// hot path of every resolution.
pub trait Rng {
    /// Advances the state and returns the next raw 32-bit output.
    fn next_u32(&mut self) -> u32;

    /// Returns the next value in `[0.0, 1.0)`.
    #[inline]
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Draws an integer uniformly from `[min, max]`, both inclusive.
    ///
    /// Computes `min + floor(next_f64() * (max - min + 1))`. Fails with
    /// [`SimError::InvalidRange`] when `max < min`, without advancing the
    /// generator.
    fn random_int(&mut self, min: i64, max: i64) -> Result<i64, SimError> {
        if max < min {
            return Err(SimError::InvalidRange { min, max });
        }

        let span = (i128::from(max) - i128::from(min) + 1) as f64;
        let offset = (self.next_f64() * span).floor() as i128;
        let value = i128::from(min) + offset;

        // next_f64 < 1.0, so offset < span; clamp guards float rounding on huge spans.
        Ok(value.clamp(i128::from(min), i128::from(max)) as i64)
    }
}

/// Seeded mulberry32 generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRng {
    seed: u32,
    state: u32,
    draws: u64,
}

impl SimRng {
    /// Creates a generator from a 32-bit seed. Every seed, including 0, is valid.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            state: seed,
            draws: 0,
        }
    }

    /// Returns the seed this generator was created with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the number of raw draws taken so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl Rng for SimRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        self.draws += 1;

        let s = self.state;
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_outputs() {
        let mut rng = SimRng::new(0);
        assert_eq!(rng.next_u32(), 1_144_304_738);
        assert_eq!(rng.next_u32(), 1_416_247);

        let mut rng = SimRng::new(42);
        assert_eq!(rng.next_u32(), 2_581_720_956);
        assert_eq!(rng.next_u32(), 1_925_393_290);
        assert_eq!(rng.next_u32(), 3_661_312_704);
        assert_eq!(rng.next_u32(), 2_876_485_805);
        assert_eq!(rng.next_u32(), 750_819_978);
    }

    #[test]
    fn float_is_output_over_two_pow_32() {
        let mut rng = SimRng::new(42);
        let value = rng.next_f64();
        assert!((value - 0.601_103_751_920_163_6).abs() < 1e-15);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);

        let seq_a: Vec<f64> = (0..10).map(|_| a.next_f64()).collect();
        let seq_b: Vec<f64> = (0..10).map(|_| b.next_f64()).collect();

        assert_eq!(seq_a, seq_b);
        assert!(seq_a.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SimRng::new(1);
        let mut b = SimRng::new(2);
        assert_ne!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn random_int_stays_in_bounds() {
        let mut rng = SimRng::new(7);
        for _ in 0..10_000 {
            let value = rng.random_int(3, 7).expect("valid range");
            assert!((3..=7).contains(&value));
        }
    }

    #[test]
    fn random_int_reference_draws() {
        let mut rng = SimRng::new(42);
        let draws: Vec<i64> = (0..8).map(|_| rng.random_int(3, 7).unwrap()).collect();
        assert_eq!(draws, vec![6, 5, 7, 6, 3, 5, 4, 6]);
    }

    #[test]
    fn random_int_single_value_range() {
        let mut rng = SimRng::new(9);
        for _ in 0..100 {
            assert_eq!(rng.random_int(5, 5), Ok(5));
        }
    }

    #[test]
    fn random_int_rejects_inverted_range() {
        let mut rng = SimRng::new(42);
        assert_eq!(
            rng.random_int(7, 3),
            Err(SimError::InvalidRange { min: 7, max: 3 })
        );
        // A rejected draw does not consume state.
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn random_int_handles_extreme_span() {
        let mut rng = SimRng::new(3);
        for _ in 0..1_000 {
            assert!(rng.random_int(i64::MIN, i64::MAX).is_ok());
        }
        let value = rng.random_int(-2, 2).unwrap();
        assert!((-2..=2).contains(&value));
    }

    #[test]
    fn draws_are_counted() {
        let mut rng = SimRng::new(5);
        rng.next_u32();
        rng.next_f64();
        rng.random_int(0, 10).unwrap();
        assert_eq!(rng.draws(), 3);
        assert_eq!(rng.seed(), 5);
    }

    mod properties {
        use crate::{Rng, SimRng};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bounded_draw_always_within_range(
                seed in any::<u32>(),
                min in -1_000i64..1_000,
                width in 0i64..1_000,
            ) {
                let max = min + width;
                let mut rng = SimRng::new(seed);
                for _ in 0..50 {
                    let value = rng.random_int(min, max).unwrap();
                    prop_assert!(value >= min && value <= max);
                }
            }

            #[test]
            fn unit_interval_for_any_seed(seed in any::<u32>()) {
                let mut rng = SimRng::new(seed);
                for _ in 0..100 {
                    let value = rng.next_f64();
                    prop_assert!((0.0..1.0).contains(&value));
                }
            }
        }
    }
}
