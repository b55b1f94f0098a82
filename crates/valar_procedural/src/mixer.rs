//! # Bit Mixer
//!
//! The integer state-transition function every random value in this crate
//! is derived from.
//!
//! One round is `state = state * (state * C1 + C2)` in wrapping 64-bit
//! arithmetic, followed by adding a fixed increment. Draws read the high
//! bits of the state (`state >> 24`) because the low bits of a multiplicative
//! mixer have short periods.
//!
//! ## Determinism Guarantee
//!
//! All arithmetic is on `i64` with explicit wrapping, so a stream seeded the
//! same way yields the same sequence on every platform.

use crate::error::{NoiseError, NoiseResult};
use crate::seed::WorldSeed;

/// Multiplier of the mixing round.
pub const MIX_MULTIPLIER: i64 = 4_746_246_356_235_635_467;

/// Addend of the mixing round.
pub const MIX_ADDEND: i64 = 143_654_758_424_313_431;

/// Per-axis multipliers folding an integer cell coordinate into a seed.
///
/// Shared by the cellular noise and the grid provider.
pub const CELL_X_MULTIPLIER: i64 = 535_651_152;
/// See [`CELL_X_MULTIPLIER`].
pub const CELL_Y_MULTIPLIER: i64 = 813_413_134;
/// See [`CELL_X_MULTIPLIER`].
pub const CELL_Z_MULTIPLIER: i64 = 1_181_783_497;

/// Largest value `state >> 24` can take; the divisor for unit doubles.
const MAX_PROCESSED_DOUBLE: f64 = (i64::MAX >> 24) as f64;

/// Rounds run by [`SeededStream`] before its first draw.
const WARM_UP_ROUNDS: usize = 3;

/// One multiplicative mixing step, without the increment.
#[inline]
#[must_use]
pub const fn mix(state: i64) -> i64 {
    state.wrapping_mul(state.wrapping_mul(MIX_MULTIPLIER).wrapping_add(MIX_ADDEND))
}

/// Maps a mixer state to `[0, bound)`.
#[inline]
pub(crate) fn bounded_from_state(state: i64, bound: i32) -> NoiseResult<i32> {
    if bound <= 0 {
        return Err(NoiseError::InvalidBound(bound));
    }

    // |remainder| < bound, so the cast is lossless
    #[allow(clippy::cast_possible_truncation)]
    let value = ((state >> 24) % i64::from(bound)) as i32;
    Ok(if value < 0 { value + bound } else { value })
}

/// Maps a mixer state to `[0, 1)`.
#[inline]
pub(crate) fn unit_from_state(state: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let value = ((state >> 24) as f64 / MAX_PROCESSED_DOUBLE).abs();

    // Only the two extreme states land here.
    if value < 1.0 {
        value
    } else {
        0.0
    }
}

/// A source of bounded integers, unit doubles and booleans.
///
/// Implemented by every stream in this crate. Each draw advances the
/// stream's state exactly once.
pub trait RandomSource {
    /// Returns a value in `[0, bound)`.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::InvalidBound`] if `bound <= 0`. The state is
    /// not advanced in that case.
    fn next_int(&mut self, bound: i32) -> NoiseResult<i32>;

    /// Returns a value in `[0, 1)`.
    fn next_double(&mut self) -> f64;

    /// Returns `true` when `next_int(2)` draws 0.
    fn next_boolean(&mut self) -> bool {
        matches!(self.next_int(2), Ok(0))
    }
}

/// A seeded stream of mixer states.
///
/// Cheap to build and to reseed: two `i64`s, no allocation. Cellular noise
/// reseeds one of these per visited voxel.
///
/// # Example
///
/// ```rust
/// use valar_procedural::mixer::{RandomSource, SeededStream};
///
/// let mut a = SeededStream::new(99);
/// let mut b = SeededStream::new(99);
/// assert_eq!(a.next_int(10).unwrap(), b.next_int(10).unwrap());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededStream {
    state: i64,
    increment: i64,
}

impl SeededStream {
    /// Creates a stream whose increment is derived from the seed.
    ///
    /// The increment is forced odd so a zero seed still leaves the
    /// all-zero fixed point of [`mix`].
    #[must_use]
    pub const fn new(seed: i64) -> Self {
        Self::with_increment(seed, seed | 1)
    }

    /// Creates a stream from a world seed.
    #[must_use]
    pub const fn from_world_seed(seed: WorldSeed) -> Self {
        Self::new(seed.value())
    }

    /// Creates a stream with an explicit per-round increment.
    #[must_use]
    pub const fn with_increment(seed: i64, increment: i64) -> Self {
        let mut stream = Self { state: seed, increment };
        let mut round = 0;
        while round < WARM_UP_ROUNDS {
            stream.state = stream.step();
            round += 1;
        }
        stream
    }

    /// Resets the stream as if freshly built from `seed`.
    #[inline]
    pub fn reseed(&mut self, seed: i64) {
        *self = Self::new(seed);
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> i64 {
        self.state
    }

    /// Returns the next 64-bit state and advances.
    #[inline]
    pub fn next_state(&mut self) -> i64 {
        let current = self.state;
        self.state = self.step();
        current
    }

    #[inline]
    const fn step(&self) -> i64 {
        mix(self.state).wrapping_add(self.increment)
    }
}

impl RandomSource for SeededStream {
    #[inline]
    fn next_int(&mut self, bound: i32) -> NoiseResult<i32> {
        let value = bounded_from_state(self.state, bound)?;
        self.state = self.step();
        Ok(value)
    }

    #[inline]
    fn next_double(&mut self) -> f64 {
        unit_from_state(self.next_state())
    }
}
