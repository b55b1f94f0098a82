//! # Octave Noise
//!
//! Fractal noise built from several simplex layers.
//!
//! Octave `i` (0-indexed) samples its own lattice at `coord / scale_i` with
//! `scale_i = base_scale / 2^i` and weight `1 / (i + 1)`. All octaves are
//! evaluated at the same raw coordinate and summed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NoiseError, NoiseResult};
use crate::noise::{NoiseGenerator, SimplexNoise};
use crate::seed::WorldSeed;

/// Base scale used when none is configured.
pub const INITIAL_SCALE: f64 = 1.0;

/// Immutable octave configuration, validated before any lattice is built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OctaveConfig {
    /// Number of layers.
    pub octaves: u32,
    /// Scale of octave 0; each further octave halves it.
    pub base_scale: f64,
}

impl OctaveConfig {
    /// Creates a configuration with the default base scale.
    #[must_use]
    pub const fn new(octaves: u32) -> Self {
        Self {
            octaves,
            base_scale: INITIAL_SCALE,
        }
    }

    /// Returns a copy with a different base scale.
    #[must_use]
    pub const fn with_base_scale(self, base_scale: f64) -> Self {
        Self { base_scale, ..self }
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// [`NoiseError::InvalidOctaveCount`] for zero octaves and
    /// [`NoiseError::InvalidScale`] for a non-positive or non-finite scale.
    pub fn validate(&self) -> NoiseResult<()> {
        if self.octaves == 0 {
            return Err(NoiseError::InvalidOctaveCount(self.octaves));
        }
        validate_scale(self.base_scale)
    }
}

impl Default for OctaveConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

fn validate_scale(scale: f64) -> NoiseResult<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(NoiseError::InvalidScale(scale))
    }
}

/// Scale of octave `index` for a given base scale.
#[inline]
fn octave_scale(base_scale: f64, index: u32) -> f64 {
    base_scale / 2.0_f64.powi(i32::try_from(index).unwrap_or(i32::MAX))
}

/// One layer of an [`OctaveNoise`].
#[derive(Clone, Debug)]
pub struct SingleOctave {
    scale: f64,
    amplitude: f64,
    noise: SimplexNoise,
}

impl SingleOctave {
    /// Creates a layer over its own lattice.
    #[must_use]
    pub fn new(seed: WorldSeed, scale: f64, amplitude: f64) -> Self {
        Self {
            scale,
            amplitude,
            noise: SimplexNoise::new(seed),
        }
    }

    /// Divisor applied to coordinates before sampling.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Weight of this layer in the sum.
    #[must_use]
    pub const fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

impl NoiseGenerator for SingleOctave {
    #[inline]
    fn eval_2d(&self, x: f64, y: f64) -> f64 {
        self.amplitude * self.noise.eval_2d(x / self.scale, y / self.scale)
    }

    #[inline]
    fn eval_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.amplitude * self.noise.eval_3d(x / self.scale, y / self.scale, z / self.scale)
    }

    fn seed(&self) -> WorldSeed {
        self.noise.seed()
    }
}

/// A fractal sum of simplex layers.
///
/// # Example
///
/// ```rust
/// use valar_procedural::{NoiseGenerator, OctaveNoise, WorldSeed};
///
/// let mut terrain = OctaveNoise::new(WorldSeed::new(7), 4).unwrap();
/// terrain.rescale(64.0).unwrap();
/// let height = terrain.eval_2d(120.0, -45.0);
/// assert!(height.is_finite());
/// ```
#[derive(Clone, Debug)]
pub struct OctaveNoise {
    seed: WorldSeed,
    base_scale: f64,
    octaves: Vec<SingleOctave>,
}

impl OctaveNoise {
    /// Builds `octaves` layers at [`INITIAL_SCALE`].
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::InvalidOctaveCount`] if `octaves` is zero.
    pub fn new(seed: WorldSeed, octaves: u32) -> NoiseResult<Self> {
        Self::with_config(seed, OctaveConfig::new(octaves))
    }

    /// Builds the layers described by `config`.
    ///
    /// Octave 0 uses `seed` itself; octave `i > 0` uses `seed.derive(i)`.
    ///
    /// # Errors
    ///
    /// Returns the error from [`OctaveConfig::validate`].
    pub fn with_config(seed: WorldSeed, config: OctaveConfig) -> NoiseResult<Self> {
        config.validate()?;

        let octaves = (0..config.octaves)
            .map(|i| {
                let layer_seed = if i == 0 { seed } else { seed.derive(u64::from(i)) };
                SingleOctave::new(layer_seed, octave_scale(config.base_scale, i), 1.0 / (f64::from(i) + 1.0))
            })
            .collect();

        debug!(seed = seed.value(), octaves = config.octaves, base_scale = config.base_scale, "built octave noise");

        Ok(Self {
            seed,
            base_scale: config.base_scale,
            octaves,
        })
    }

    /// Recomputes every octave's scale from a new base scale.
    ///
    /// Applying the same base scale again changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::InvalidScale`] for a non-positive or
    /// non-finite scale; the current scales are kept.
    pub fn rescale(&mut self, base_scale: f64) -> NoiseResult<()> {
        validate_scale(base_scale)?;

        self.base_scale = base_scale;
        for (i, octave) in (0_u32..).zip(self.octaves.iter_mut()) {
            octave.scale = octave_scale(base_scale, i);
        }
        Ok(())
    }

    /// Number of layers.
    #[must_use]
    pub fn octave_count(&self) -> usize {
        self.octaves.len()
    }

    /// Current base scale.
    #[must_use]
    pub const fn base_scale(&self) -> f64 {
        self.base_scale
    }

    /// The layers, lowest frequency first.
    #[must_use]
    pub fn octaves(&self) -> &[SingleOctave] {
        &self.octaves
    }
}

impl NoiseGenerator for OctaveNoise {
    fn eval_2d(&self, x: f64, y: f64) -> f64 {
        self.octaves.iter().map(|octave| octave.eval_2d(x, y)).sum()
    }

    fn eval_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.octaves.iter().map(|octave| octave.eval_3d(x, y, z)).sum()
    }

    fn seed(&self) -> WorldSeed {
        self.seed
    }
}
