//! # Noise Settings
//!
//! World-level noise configuration, loaded once at startup from TOML and
//! validated before anything is built.
//!
//! ```toml
//! seed = 12345
//!
//! [octave]
//! octaves = 4
//! base_scale = 64.0
//!
//! [positional]
//! zoom = 16.0
//! grid_zoom = 16
//! ```
//!
//! Leaving out `seed` draws a random one (logged at `info`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{NoiseError, NoiseResult};
use crate::math::sigmoid;
use crate::noise::NoiseGenerator;
use crate::octave::{OctaveConfig, OctaveNoise};
use crate::positional::{GridRandom, GridRandomProvider, PositionalRandomFactory, PositionalStream};
use crate::seed::WorldSeed;
use crate::worley::WorleyNoise;

/// Steepness of the terrain squashing curve.
const TERRAIN_STEEPNESS: f64 = 4.0;

/// Granularity of positional streams.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PositionalConfig {
    /// Cell size for [`PositionalRandomFactory`] streams.
    pub zoom: f64,
    /// Cell size for [`GridRandomProvider`] streams.
    pub grid_zoom: i64,
}

impl PositionalConfig {
    /// Checks both zoom factors.
    ///
    /// # Errors
    ///
    /// [`NoiseError::InvalidZoom`] or [`NoiseError::InvalidGridZoom`].
    pub fn validate(&self) -> NoiseResult<()> {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(NoiseError::InvalidZoom(self.zoom));
        }
        if self.grid_zoom <= 0 {
            return Err(NoiseError::InvalidGridZoom(self.grid_zoom));
        }
        Ok(())
    }
}

impl Default for PositionalConfig {
    fn default() -> Self {
        Self {
            zoom: 16.0,
            grid_zoom: 16,
        }
    }
}

/// Complete noise configuration for one world.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseSettings {
    /// World seed; `None` draws a random one at build time.
    pub seed: Option<i64>,
    /// Terrain octave layers.
    pub octave: OctaveConfig,
    /// Positional stream granularity.
    pub positional: PositionalConfig,
}

impl NoiseSettings {
    /// Parses and validates settings.
    ///
    /// # Errors
    ///
    /// [`NoiseError::Config`] for malformed TOML, otherwise any error from
    /// [`Self::validate`].
    pub fn from_toml_str(text: &str) -> NoiseResult<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a settings file.
    ///
    /// # Errors
    ///
    /// [`NoiseError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> NoiseResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading noise settings");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// The first invalid value found.
    pub fn validate(&self) -> NoiseResult<()> {
        self.octave
            .validate()
            .and_then(|()| self.positional.validate())
            .map_err(|err| {
                warn!(%err, "rejected noise settings");
                err
            })
    }

    /// The configured seed, or a freshly drawn one.
    #[must_use]
    pub fn world_seed(&self) -> WorldSeed {
        self.seed.map_or_else(WorldSeed::random, WorldSeed::new)
    }

    /// Builds every field for the world.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::validate`].
    pub fn build(&self) -> NoiseResult<NoiseStack> {
        self.validate()?;
        let seed = self.world_seed();

        Ok(NoiseStack {
            seed,
            terrain: OctaveNoise::with_config(seed, self.octave)?,
            cells: WorleyNoise::new(seed),
            positional: PositionalRandomFactory::new(seed),
            grid: GridRandomProvider::new(seed),
            zoom: self.positional.zoom,
            grid_zoom: self.positional.grid_zoom,
        })
    }
}

/// All noise fields for one world seed, built from [`NoiseSettings`].
///
/// Immutable; share it across generation threads.
#[derive(Clone, Debug)]
pub struct NoiseStack {
    seed: WorldSeed,
    /// Fractal terrain field.
    pub terrain: OctaveNoise,
    /// Cellular field.
    pub cells: WorleyNoise,
    /// Factory for per-cell streams.
    pub positional: PositionalRandomFactory,
    /// Integer-grid stream provider.
    pub grid: GridRandomProvider,
    zoom: f64,
    grid_zoom: i64,
}

impl NoiseStack {
    /// The seed every field was built from.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Stream for the configured-zoom cell containing `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`NoiseError::NonFiniteCoordinate`] for NaN or infinite input.
    pub fn random_at(&self, x: f64, y: f64) -> NoiseResult<PositionalStream> {
        self.positional.create_random(x, y, self.zoom)
    }

    /// Grid stream for the configured-zoom cell containing `(x, y)`.
    ///
    /// # Errors
    ///
    /// Cannot fail once built; the zoom was validated.
    pub fn grid_random_at(&self, x: i64, y: i64) -> NoiseResult<GridRandom> {
        self.grid.create_random(x, y, self.grid_zoom)
    }

    /// Terrain field squashed into `(0, 1)`.
    #[must_use]
    pub fn shaped_terrain(&self, x: f64, y: f64) -> f64 {
        sigmoid(self.terrain.eval_2d(x, y), 1.0, 0.0, TERRAIN_STEEPNESS, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::RandomSource;

    const SAMPLE: &str = r"
seed = 12345

[octave]
octaves = 4
base_scale = 64.0

[positional]
zoom = 4.0
grid_zoom = 8
";

    #[test]
    fn test_parse_sample() {
        let settings = NoiseSettings::from_toml_str(SAMPLE).unwrap();
        assert_eq!(settings.seed, Some(12345));
        assert_eq!(settings.octave, OctaveConfig::new(4).with_base_scale(64.0));
        assert_eq!(settings.positional.zoom, 4.0);
        assert_eq!(settings.positional.grid_zoom, 8);
    }

    #[test]
    fn test_defaults() {
        let settings = NoiseSettings::from_toml_str("").unwrap();
        assert_eq!(settings, NoiseSettings::default());
        assert_eq!(settings.seed, None);
        assert_eq!(settings.octave.octaves, 1);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = NoiseSettings::from_toml_str("[octave]\noctaves = 0\n").unwrap_err();
        assert!(matches!(err, NoiseError::InvalidOctaveCount(0)));

        let err = NoiseSettings::from_toml_str("[positional]\nzoom = -1.0\n").unwrap_err();
        assert!(matches!(err, NoiseError::InvalidZoom(_)));

        let err = NoiseSettings::from_toml_str("[positional]\ngrid_zoom = 0\n").unwrap_err();
        assert!(matches!(err, NoiseError::InvalidGridZoom(0)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(NoiseSettings::from_toml_str("seed = \"abc\""), Err(NoiseError::Config(_))));
        assert!(matches!(NoiseSettings::from_toml_str("colour = 3"), Err(NoiseError::Config(_))));
    }

    #[test]
    fn test_rejects_misspelled_section_keys() {
        let err = NoiseSettings::from_toml_str("seed = 1\n[octave]\noctave = 8\n").unwrap_err();
        assert!(matches!(err, NoiseError::Config(_)));
        assert!(err.is_configuration());

        let err = NoiseSettings::from_toml_str("[positional]\nzom = 4.0\n").unwrap_err();
        assert!(matches!(err, NoiseError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = NoiseSettings::load("/nonexistent/valar/noise.toml").unwrap_err();
        assert!(matches!(err, NoiseError::Io(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_build_matches_direct_construction() {
        let stack = NoiseSettings::from_toml_str(SAMPLE).unwrap().build().unwrap();
        let seed = WorldSeed::new(12345);
        assert_eq!(stack.seed(), seed);

        let mut terrain = OctaveNoise::new(seed, 4).unwrap();
        terrain.rescale(64.0).unwrap();
        assert_eq!(stack.terrain.eval_2d(10.0, 20.0), terrain.eval_2d(10.0, 20.0));
        assert_eq!(stack.cells.eval_2d(1.5, 2.5), WorleyNoise::new(seed).eval_2d(1.5, 2.5));

        let mut from_stack = stack.random_at(100.0, 200.0).unwrap();
        let mut direct = PositionalStream::at(seed, 100.0, 200.0, 4.0).unwrap();
        assert_eq!(from_stack.next_int(16).unwrap(), direct.next_int(16).unwrap());

        let mut grid = stack.grid_random_at(3, 3).unwrap();
        let mut same_cell = stack.grid_random_at(7, 0).unwrap();
        assert_eq!(grid.next_double(), same_cell.next_double());
    }

    #[test]
    fn test_unseeded_build_draws_a_seed() {
        let stack = NoiseSettings::default().build().unwrap();
        assert_eq!(stack.terrain.seed(), stack.seed());
    }

    #[test]
    fn test_shaped_terrain_in_unit_band() {
        let stack = NoiseSettings::from_toml_str(SAMPLE).unwrap().build().unwrap();
        for i in 0..500 {
            let v = stack.shaped_terrain(f64::from(i) * 3.1, f64::from(i) * -1.7);
            assert!(v > 0.0 && v < 1.0);
        }
    }
}
