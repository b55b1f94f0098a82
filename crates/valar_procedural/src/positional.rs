//! # Positional Random Streams
//!
//! Random streams whose entire output is fixed by `(seed, position, zoom)`.
//!
//! World generation runs chunks independently, in any order, on any
//! thread. A feature straddling a chunk border is generated twice, once
//! per chunk, and both halves must agree. Asking the factory for the stream
//! at the same position yields the same draws every time, with no shared
//! state to coordinate.
//!
//! ## Derivation
//!
//! ```text
//! cell  = (floor(x / zoom), floor(y / zoom))
//! n     = simplex(seed).eval_2d(cell)
//! base  = floor(266587864571 * (0.2 + n))
//! init  = mix(mix(mix(base) + base) + base)
//! state = mix(mix(mix(mix(init) + base) + init) + base)
//! draw  : read state, then state = mix(state + init)
//! ```
//!
//! Every position inside one `zoom`-sized cell shares a stream.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{NoiseError, NoiseResult};
use crate::math::check_finite;
use crate::mixer::{
    bounded_from_state, mix, unit_from_state, RandomSource, CELL_X_MULTIPLIER, CELL_Y_MULTIPLIER,
};
use crate::noise::{NoiseGenerator, SimplexNoise};
use crate::seed::WorldSeed;

/// Spreads the noise value across the 64-bit seed space.
const BASE_SEED_SCALE: f64 = 266_587_864_571.0;

/// Keeps the base seed away from zero for noise values near zero.
const BASE_SEED_BIAS: f64 = 0.2;

/// Values read from a settings vector: `[zoom, x, y]`.
pub const SETTINGS_LEN: usize = 3;

/// Builds [`PositionalStream`]s for one world seed.
///
/// Holds the simplex lattice so the table is shuffled once, not per query.
/// Share it read-only across threads; every stream it returns belongs to
/// the caller alone.
#[derive(Clone, Debug)]
pub struct PositionalRandomFactory {
    noise: SimplexNoise,
}

impl PositionalRandomFactory {
    /// Creates a factory for `seed`.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        debug!(seed = seed.value(), "built positional random factory");
        Self {
            noise: SimplexNoise::new(seed),
        }
    }

    /// The world seed.
    #[must_use]
    pub fn seed(&self) -> WorldSeed {
        self.noise.seed()
    }

    /// Returns the stream for the `zoom`-sized cell containing `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`NoiseError::NonFiniteCoordinate`] if a coordinate (or its cell) is
    /// NaN or infinite, [`NoiseError::InvalidZoom`] if `zoom` is not a
    /// finite positive number.
    pub fn create_random(&self, x: f64, y: f64, zoom: f64) -> NoiseResult<PositionalStream> {
        check_finite(x, y, 0.0)?;
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(NoiseError::InvalidZoom(zoom));
        }

        let cell_x = (x / zoom).floor();
        let cell_y = (y / zoom).floor();
        // A tiny zoom can push the cell to infinity.
        check_finite(cell_x, cell_y, 0.0)?;

        Ok(PositionalStream::from_noise_value(self.noise.eval_2d(cell_x, cell_y)))
    }

    /// Reads `[zoom, x, y]` from a settings vector; extra values are ignored.
    ///
    /// # Errors
    ///
    /// [`NoiseError::MissingSettings`] if fewer than three values are
    /// given, otherwise as [`Self::create_random`].
    pub fn create_from_settings(&self, settings: &[f64]) -> NoiseResult<PositionalStream> {
        match settings {
            [zoom, x, y, ..] => self.create_random(*x, *y, *zoom),
            _ => Err(NoiseError::MissingSettings {
                required: SETTINGS_LEN,
                provided: settings.len(),
            }),
        }
    }
}

/// A random stream bound to one position.
///
/// Two streams created from the same `(seed, position, zoom)` produce the
/// same infinite sequence. Not meant to be shared between threads: create
/// one per caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionalStream {
    state: i64,
    init_seed: i64,
    base_seed: i64,
}

impl PositionalStream {
    /// One-shot form of [`PositionalRandomFactory::create_random`].
    ///
    /// Builds a throwaway factory; prefer a shared factory in loops.
    ///
    /// # Errors
    ///
    /// As [`PositionalRandomFactory::create_random`].
    pub fn at(seed: WorldSeed, x: f64, y: f64, zoom: f64) -> NoiseResult<Self> {
        PositionalRandomFactory::new(seed).create_random(x, y, zoom)
    }

    /// One-shot form of [`PositionalRandomFactory::create_from_settings`].
    ///
    /// # Errors
    ///
    /// As [`PositionalRandomFactory::create_from_settings`].
    pub fn from_settings(seed: WorldSeed, settings: &[f64]) -> NoiseResult<Self> {
        if settings.len() < SETTINGS_LEN {
            return Err(NoiseError::MissingSettings {
                required: SETTINGS_LEN,
                provided: settings.len(),
            });
        }
        PositionalRandomFactory::new(seed).create_from_settings(settings)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_noise_value(noise: f64) -> Self {
        let base_seed = (BASE_SEED_SCALE * (BASE_SEED_BIAS + noise)).floor() as i64;

        let mut init_seed = mix(base_seed);
        init_seed = mix(init_seed.wrapping_add(base_seed));
        init_seed = mix(init_seed.wrapping_add(base_seed));

        let mut state = mix(init_seed);
        state = mix(state.wrapping_add(base_seed));
        state = mix(state.wrapping_add(init_seed));
        state = mix(state.wrapping_add(base_seed));

        Self {
            state,
            init_seed,
            base_seed,
        }
    }

    /// Current working state.
    #[must_use]
    pub const fn state(&self) -> i64 {
        self.state
    }

    /// Seed derived from the noise value at the position's cell.
    #[must_use]
    pub const fn base_seed(&self) -> i64 {
        self.base_seed
    }

    /// Increment added before every mixing round.
    #[must_use]
    pub const fn init_seed(&self) -> i64 {
        self.init_seed
    }

    #[inline]
    fn advance(&mut self) {
        self.state = mix(self.state.wrapping_add(self.init_seed));
    }
}

impl RandomSource for PositionalStream {
    fn next_int(&mut self, bound: i32) -> NoiseResult<i32> {
        let value = bounded_from_state(self.state, bound)?;
        self.advance();
        Ok(value)
    }

    fn next_double(&mut self) -> f64 {
        let value = unit_from_state(self.state);
        self.advance();
        value
    }
}

/// Integer-grid random provider.
///
/// Cheaper than [`PositionalRandomFactory`] (no noise lattice) for callers
/// that only need a per-cell stream on an integer grid. The cell seed is
/// linear in the cell coordinate and then expanded by `ChaCha8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridRandomProvider {
    seed: WorldSeed,
}

impl GridRandomProvider {
    /// Creates a provider for `seed`.
    #[must_use]
    pub const fn new(seed: WorldSeed) -> Self {
        Self { seed }
    }

    /// The world seed.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Returns the stream for the `zoom`-sized grid cell containing `(x, y)`.
    ///
    /// Cells are found by integer division, which truncates toward zero.
    ///
    /// # Errors
    ///
    /// [`NoiseError::InvalidGridZoom`] if `zoom <= 0`.
    pub fn create_random(&self, x: i64, y: i64, zoom: i64) -> NoiseResult<GridRandom> {
        if zoom <= 0 {
            return Err(NoiseError::InvalidGridZoom(zoom));
        }

        let cell_seed = self
            .seed
            .value()
            .wrapping_add(CELL_X_MULTIPLIER.wrapping_mul(x / zoom))
            .wrapping_add(CELL_Y_MULTIPLIER.wrapping_mul(y / zoom));

        #[allow(clippy::cast_sign_loss)]
        let rng = ChaCha8Rng::seed_from_u64(cell_seed as u64);
        Ok(GridRandom { rng })
    }
}

/// Stream returned by [`GridRandomProvider`].
///
/// Also an [`RngCore`], so `rand` distributions can draw from it.
#[derive(Clone, Debug)]
pub struct GridRandom {
    rng: ChaCha8Rng,
}

impl RandomSource for GridRandom {
    fn next_int(&mut self, bound: i32) -> NoiseResult<i32> {
        if bound <= 0 {
            return Err(NoiseError::InvalidBound(bound));
        }
        Ok(self.rng.gen_range(0..bound))
    }

    fn next_double(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

impl RngCore for GridRandom {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(stream: &mut impl RandomSource, n: usize) -> Vec<i32> {
        (0..n).map(|_| stream.next_int(1_000_000).unwrap()).collect()
    }

    #[test]
    fn test_positional_coherence() {
        let factory = PositionalRandomFactory::new(WorldSeed::new(12345));
        let mut a = factory.create_random(100.0, 200.0, 4.0).unwrap();
        let mut b = factory.create_random(100.0, 200.0, 4.0).unwrap();
        assert_eq!(draws(&mut a, 500), draws(&mut b, 500));
    }

    #[test]
    fn test_one_shot_matches_factory() {
        let seed = WorldSeed::new(-77);
        let factory = PositionalRandomFactory::new(seed);
        let a = factory.create_random(-13.5, 9.25, 8.0).unwrap();
        let b = PositionalStream::at(seed, -13.5, 9.25, 8.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_positions_in_one_cell_share_a_stream() {
        let factory = PositionalRandomFactory::new(WorldSeed::new(9));
        // [16, 32) x [0, 16) is one cell at zoom 16.
        let a = factory.create_random(16.0, 0.5, 16.0).unwrap();
        let b = factory.create_random(31.9, 15.9, 16.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_neighbouring_cells_differ() {
        let factory = PositionalRandomFactory::new(WorldSeed::new(9));
        let distinct = (0..32)
            .map(|i| factory.create_random(f64::from(i) * 4.0 + 0.5, 1.0, 1.0).unwrap().base_seed())
            .collect::<std::collections::HashSet<_>>()
            .len();
        assert!(distinct > 28, "Only {distinct} distinct streams in 32 cells");
    }

    #[test]
    fn test_draw_advances_state() {
        let mut stream = PositionalStream::at(WorldSeed::new(1), 0.5, 0.5, 1.0).unwrap();
        let before = stream.state();
        let _ = stream.next_double();
        assert_eq!(stream.state(), mix(before.wrapping_add(stream.init_seed())));
    }

    #[test]
    fn test_settings_vector() {
        let seed = WorldSeed::new(31);
        let direct = PositionalStream::at(seed, 5.0, 6.0, 2.0).unwrap();
        assert_eq!(PositionalStream::from_settings(seed, &[2.0, 5.0, 6.0]).unwrap(), direct);
        assert_eq!(PositionalStream::from_settings(seed, &[2.0, 5.0, 6.0, 99.0]).unwrap(), direct);

        let err = PositionalStream::from_settings(seed, &[2.0, 5.0]).unwrap_err();
        assert!(matches!(err, NoiseError::MissingSettings { required: 3, provided: 2 }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_inputs() {
        let factory = PositionalRandomFactory::new(WorldSeed::new(0));
        assert!(matches!(factory.create_random(0.0, 0.0, 0.0), Err(NoiseError::InvalidZoom(_))));
        assert!(matches!(factory.create_random(0.0, 0.0, -4.0), Err(NoiseError::InvalidZoom(_))));
        assert!(factory.create_random(f64::NAN, 0.0, 1.0).unwrap_err().is_domain());
        assert!(factory.create_random(1e308, 0.0, 1e-308).unwrap_err().is_domain());

        let mut stream = factory.create_random(1.0, 1.0, 1.0).unwrap();
        assert!(matches!(stream.next_int(0), Err(NoiseError::InvalidBound(0))));
    }

    #[test]
    fn test_negative_positions() {
        let factory = PositionalRandomFactory::new(WorldSeed::new(12345));
        let mut a = factory.create_random(-3.5, -0.0001, 1.0).unwrap();
        let mut b = factory.create_random(-3.5, -0.0001, 1.0).unwrap();
        assert_eq!(draws(&mut a, 50), draws(&mut b, 50));
    }

    #[test]
    fn test_grid_provider() {
        let provider = GridRandomProvider::new(WorldSeed::new(4));
        let mut a = provider.create_random(40, 70, 16).unwrap();
        let mut b = provider.create_random(47, 79, 16).unwrap();
        assert_eq!(draws(&mut a, 100), draws(&mut b, 100));

        let mut c = provider.create_random(48, 70, 16).unwrap();
        let mut a = provider.create_random(40, 70, 16).unwrap();
        assert_ne!(draws(&mut a, 10), draws(&mut c, 10));

        assert!(matches!(provider.create_random(0, 0, 0), Err(NoiseError::InvalidGridZoom(0))));
    }

    #[test]
    fn test_grid_seed_shares_cell_multipliers() {
        let provider = GridRandomProvider::new(WorldSeed::new(100));
        let mut from_provider = provider.create_random(-20, 35, 16).unwrap();

        // -20 / 16 == -1 and 35 / 16 == 2 under truncating division.
        let cell_seed = 100 - CELL_X_MULTIPLIER + 2 * CELL_Y_MULTIPLIER;
        #[allow(clippy::cast_sign_loss)]
        let mut direct = ChaCha8Rng::seed_from_u64(cell_seed as u64);
        assert_eq!(from_provider.next_u64(), direct.next_u64());
    }

    #[test]
    fn test_grid_random_ranges() {
        let mut rng = GridRandomProvider::new(WorldSeed::new(8)).create_random(-5, 5, 1).unwrap();
        for _ in 0..1000 {
            assert!((0..3).contains(&rng.next_int(3).unwrap()));
            assert!((0.0..1.0).contains(&rng.next_double()));
        }
        assert!(rng.next_int(-1).is_err());
        let _ = rng.next_u64();
    }
}
