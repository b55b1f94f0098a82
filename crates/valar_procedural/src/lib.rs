//! # VALAR Procedural Noise
//!
//! Deterministic noise and positional randomness for world generation.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and coordinate always produce the same value
//! 2. **Order-free**: No global counter or cache; chunks can be generated in
//!    any order on any thread and still agree at their borders
//! 3. **Stateless fields**: Noise fields are immutable after construction
//! 4. **Fast**: No allocation or locking per sample
//!
//! ## Core Components
//!
//! - `SeededStream`: the bit mixer every random value is drawn from
//! - `SimplexNoise`: coherent 2D/3D noise
//! - `WorleyNoise`: cellular distance noise
//! - `OctaveNoise`: fractal sum of simplex layers
//! - `PositionalRandomFactory`: reproducible random streams per position
//! - `NoiseSettings`: TOML configuration building all of the above
//!
//! ## Example
//!
//! ```rust
//! use valar_procedural::{NoiseGenerator, PositionalRandomFactory, RandomSource, WorldSeed};
//!
//! let seed = WorldSeed::new(12345);
//! let factory = PositionalRandomFactory::new(seed);
//!
//! // Two chunks asking about the same spot get the same answers.
//! let mut a = factory.create_random(100.0, 200.0, 4.0).unwrap();
//! let mut b = factory.create_random(100.0, 200.0, 4.0).unwrap();
//! assert_eq!(a.next_int(16).unwrap(), b.next_int(16).unwrap());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod math;
pub mod mixer;
pub mod noise;
pub mod octave;
pub mod positional;
pub mod seed;
pub mod worley;

pub use config::{NoiseSettings, NoiseStack, PositionalConfig};
pub use error::{NoiseError, NoiseResult};
pub use mixer::{RandomSource, SeededStream};
pub use noise::{NoiseGenerator, SimplexNoise};
pub use octave::{OctaveConfig, OctaveNoise, SingleOctave};
pub use positional::{GridRandom, GridRandomProvider, PositionalRandomFactory, PositionalStream};
pub use seed::WorldSeed;
pub use worley::{VoxelCellPoint, WorleyNoise};
