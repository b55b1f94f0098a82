//! # Simplex Noise Implementation
//!
//! High-performance, deterministic coherent noise.
//!
//! ## Why Simplex over Perlin?
//!
//! - Fewer directional artifacts
//! - Better gradient distribution
//! - O(n) complexity vs O(2^n) for Perlin
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, this implementation will produce
//! **exactly** the same values on any platform, any time. The permutation
//! table is shuffled by the crate's own [`SeededStream`], never by an
//! external RNG whose algorithm could change underneath us.

use crate::error::NoiseResult;
use crate::math::{check_finite, fast_floor};
use crate::mixer::SeededStream;
use crate::seed::WorldSeed;

/// A coherent field that can be sampled at any real coordinate.
///
/// Implementations are immutable after construction and may be shared
/// read-only across threads.
pub trait NoiseGenerator: Send + Sync {
    /// Samples the field in 2D.
    fn eval_2d(&self, x: f64, y: f64) -> f64;

    /// Samples the field in 3D.
    fn eval_3d(&self, x: f64, y: f64, z: f64) -> f64;

    /// Returns the seed this field was built from.
    fn seed(&self) -> WorldSeed;

    /// Samples in 2D, rejecting NaN and infinite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`crate::NoiseError::NonFiniteCoordinate`] for non-finite input.
    fn try_eval_2d(&self, x: f64, y: f64) -> NoiseResult<f64> {
        check_finite(x, y, 0.0)?;
        Ok(self.eval_2d(x, y))
    }

    /// Samples in 3D, rejecting NaN and infinite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`crate::NoiseError::NonFiniteCoordinate`] for non-finite input.
    fn try_eval_3d(&self, x: f64, y: f64, z: f64) -> NoiseResult<f64> {
        check_finite(x, y, z)?;
        Ok(self.eval_3d(x, y, z))
    }
}

/// 12 gradient vectors for 2D simplex.
/// These point to vertices of a regular 12-gon.
const GRAD_2D: [[i8; 2]; 12] = [
    [1, 0], [1, 1], [0, 1], [-1, 1],
    [-1, 0], [-1, -1], [0, -1], [1, -1],
    [1, 0], [0, 1], [-1, 0], [0, -1],
];

/// 12 cube-edge gradient vectors for 3D simplex.
const GRAD_3D: [[i8; 3]; 12] = [
    [1, 1, 0], [-1, 1, 0], [1, -1, 0], [-1, -1, 0],
    [1, 0, 1], [-1, 0, 1], [1, 0, -1], [-1, 0, -1],
    [0, 1, 1], [0, -1, 1], [0, 1, -1], [0, -1, -1],
];

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
#[derive(Clone)]
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// Creates a new permutation table from a seed.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        // Initialize with identity permutation
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle driven by the bit mixer
        let mut stream = SeededStream::from_world_seed(seed);
        for i in (1..256usize).rev() {
            let j = (stream.next_state() >> 24).rem_euclid(i as i64 + 1) as usize;
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        perm.copy_within(0..256, 256);

        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }
}

/// 2D/3D Simplex noise generator.
///
/// Produces smooth, continuous noise values approximately in `[-1, 1]`.
///
/// # Performance
///
/// - O(1) per sample
/// - No allocations
/// - Construction shuffles a 256-entry table; build once per seed
///
/// # Example
///
/// ```rust
/// use valar_procedural::{NoiseGenerator, SimplexNoise, WorldSeed};
///
/// let noise = SimplexNoise::new(WorldSeed::new(42));
/// let value = noise.eval_2d(100.5, 200.3);
/// assert!(value.abs() <= 1.1);
/// assert_eq!(value, noise.eval_2d(100.5, 200.3));
/// ```
#[derive(Clone)]
pub struct SimplexNoise {
    seed: WorldSeed,
    /// The permutation table.
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid: (sqrt(3) - 1) / 2.
    const F2: f64 = 0.366_025_403_784_438_6;
    /// Unskewing factor for 2D simplex grid: (3 - sqrt(3)) / 6.
    const G2: f64 = 0.211_324_865_405_187_1;
    /// Skewing factor for 3D simplex grid.
    const F3: f64 = 1.0 / 3.0;
    /// Unskewing factor for 3D simplex grid.
    const G3: f64 = 1.0 / 6.0;

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            seed,
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples 2D simplex noise at the given coordinates.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::similar_names)]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        // Skew input coordinates to simplex grid
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        // Unskew to get first corner in simplex
        let unskew = f64::from(i.wrapping_add(j)) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        // Determine which simplex we're in (upper or lower triangle)
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        // Offsets for second and third corners
        let x1 = x0 - f64::from(i1 as u8) + Self::G2;
        let y1 = y0 - f64::from(j1 as u8) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        // Hash coordinates to get gradient indices
        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let p = &self.perm_table;

        let gi0 = p.get(ii + p.get(jj));
        let gi1 = p.get(ii + i1 + p.get(jj + j1));
        let gi2 = p.get(ii + 1 + p.get(jj + 1));

        // Calculate contribution from three corners
        let n0 = Self::contribution_2d(x0, y0, gi0);
        let n1 = Self::contribution_2d(x1, y1, gi1);
        let n2 = Self::contribution_2d(x2, y2, gi2);

        // The magic number 70.0 normalizes the output
        70.0 * (n0 + n1 + n2)
    }

    /// Samples 3D simplex noise at the given coordinates.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::similar_names, clippy::many_single_char_names)]
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let skew = (x + y + z) * Self::F3;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);
        let k = fast_floor(z + skew);

        let unskew = f64::from(i.wrapping_add(j).wrapping_add(k)) * Self::G3;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);
        let z0 = z - (f64::from(k) - unskew);

        // Rank the offsets to pick one of the six tetrahedra
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - f64::from(i1 as u8) + Self::G3;
        let y1 = y0 - f64::from(j1 as u8) + Self::G3;
        let z1 = z0 - f64::from(k1 as u8) + Self::G3;
        let x2 = x0 - f64::from(i2 as u8) + 2.0 * Self::G3;
        let y2 = y0 - f64::from(j2 as u8) + 2.0 * Self::G3;
        let z2 = z0 - f64::from(k2 as u8) + 2.0 * Self::G3;
        let x3 = x0 - 1.0 + 3.0 * Self::G3;
        let y3 = y0 - 1.0 + 3.0 * Self::G3;
        let z3 = z0 - 1.0 + 3.0 * Self::G3;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let kk = (k & 255) as usize;
        let p = &self.perm_table;

        let gi0 = p.get(ii + p.get(jj + p.get(kk)));
        let gi1 = p.get(ii + i1 + p.get(jj + j1 + p.get(kk + k1)));
        let gi2 = p.get(ii + i2 + p.get(jj + j2 + p.get(kk + k2)));
        let gi3 = p.get(ii + 1 + p.get(jj + 1 + p.get(kk + 1)));

        let n0 = Self::contribution_3d(x0, y0, z0, gi0);
        let n1 = Self::contribution_3d(x1, y1, z1, gi1);
        let n2 = Self::contribution_3d(x2, y2, z2, gi2);
        let n3 = Self::contribution_3d(x3, y3, z3, gi3);

        32.0 * (n0 + n1 + n2 + n3)
    }

    /// Calculates the contribution from one corner of a 2D simplex.
    #[inline]
    fn contribution_2d(x: f64, y: f64, hash: usize) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let grad = GRAD_2D[hash % 12];
            let t2 = t * t;
            t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
        }
    }

    /// Calculates the contribution from one corner of a 3D simplex.
    #[inline]
    fn contribution_3d(x: f64, y: f64, z: f64, hash: usize) -> f64 {
        let t = 0.6 - x * x - y * y - z * z;
        if t < 0.0 {
            0.0
        } else {
            let grad = GRAD_3D[hash % 12];
            let t2 = t * t;
            t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]) + z * f64::from(grad[2]))
        }
    }
}

impl NoiseGenerator for SimplexNoise {
    #[inline]
    fn eval_2d(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y)
    }

    #[inline]
    fn eval_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.sample_3d(x, y, z)
    }

    fn seed(&self) -> WorldSeed {
        self.seed
    }
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The table is 512 bytes of noise; the seed identifies it.
        f.debug_struct("SimplexNoise").field("seed", &self.seed).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = WorldSeed::new(12345);
        let noise1 = SimplexNoise::new(seed);
        let noise2 = SimplexNoise::new(seed);

        // Same seed should produce identical results
        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let y = f64::from(i) * 0.17;
            assert_eq!(noise1.eval_2d(x, y).to_bits(), noise2.eval_2d(x, y).to_bits());
            assert_eq!(
                noise1.eval_3d(x, y, -x).to_bits(),
                noise2.eval_3d(x, y, -x).to_bits()
            );
        }
    }

    #[test]
    fn test_permutation_is_a_permutation() {
        let table = PermutationTable::new(WorldSeed::new(9));
        let mut seen = [false; 256];
        for &value in &table.perm[..256] {
            seen[usize::from(value)] = true;
        }
        assert!(seen.iter().all(|&s| s), "Every byte must appear exactly once");
        assert_eq!(table.perm[..256], table.perm[256..]);
    }

    #[test]
    fn test_different_seeds_different_results() {
        let noise1 = SimplexNoise::new(WorldSeed::new(1));
        let noise2 = SimplexNoise::new(WorldSeed::new(2));

        let differing = (0..50)
            .filter(|&i| {
                let x = f64::from(i) * 3.7 + 0.5;
                noise1.eval_2d(x, x * 0.3) != noise2.eval_2d(x, x * 0.3)
            })
            .count();

        assert!(differing > 40, "Different seeds should produce different results");
    }

    #[test]
    fn test_range() {
        let noise = SimplexNoise::new(WorldSeed::new(42));

        // Sample many points and verify range
        for i in 0..10_000 {
            let x = (f64::from(i) * 0.1) - 500.0;
            let y = (f64::from(i) * 0.13) - 650.0;
            let value = noise.eval_2d(x, y);
            assert!(value.abs() <= 1.05, "Value {value} out of range at ({x}, {y})");

            let value = noise.eval_3d(x, y, x * 0.5);
            assert!(value.abs() <= 1.05, "Value {value} out of range at ({x}, {y}, {})", x * 0.5);
        }
    }

    #[test]
    fn test_continuity() {
        let noise = SimplexNoise::new(WorldSeed::new(42));

        // Sample adjacent points - should be similar
        let (x, y, z) = (100.0, 100.0, 100.0);
        let delta = 0.001;

        let diff1 = (noise.eval_2d(x, y) - noise.eval_2d(x + delta, y)).abs();
        let diff2 = (noise.eval_2d(x, y) - noise.eval_2d(x, y + delta)).abs();
        let diff3 = (noise.eval_3d(x, y, z) - noise.eval_3d(x, y, z + delta)).abs();

        assert!(diff1 < 0.01, "Noise should be continuous: diff = {diff1}");
        assert!(diff2 < 0.01, "Noise should be continuous: diff = {diff2}");
        assert!(diff3 < 0.01, "Noise should be continuous: diff = {diff3}");
    }

    #[test]
    fn test_negative_coordinates() {
        let noise = SimplexNoise::new(WorldSeed::new(-5));
        let a = noise.eval_2d(-3.5, -0.0001);
        let b = noise.eval_2d(-3.5, -0.0001);
        assert!(a.is_finite());
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_far_coordinates_do_not_overflow() {
        let noise = SimplexNoise::new(WorldSeed::new(3));
        // Past the i32 lattice the skewed cell index saturates.
        for x in [3e9, -3e9, 1e19, -1e19] {
            assert!(noise.eval_2d(x, -x).is_finite());
            assert!(noise.eval_2d(x, x).is_finite());
            assert!(noise.eval_3d(x, x, -x).is_finite());
        }
    }

    #[test]
    fn test_checked_eval_rejects_nan() {
        let noise = SimplexNoise::new(WorldSeed::new(1));
        assert!(noise.try_eval_2d(f64::NAN, 0.0).is_err());
        assert!(noise.try_eval_3d(0.0, 0.0, f64::INFINITY).is_err());
        assert_eq!(noise.try_eval_2d(1.5, 2.5).unwrap(), noise.eval_2d(1.5, 2.5));
    }

    #[test]
    fn test_seed_accessor() {
        assert_eq!(SimplexNoise::new(WorldSeed::new(77)).seed(), WorldSeed::new(77));
    }
}
