//! # Procedural Error Types
//!
//! All errors that can occur while configuring or querying noise.
//!
//! Nothing here is transient: there is no I/O on the hot path, so every
//! error is a caller mistake and should abort generation of the feature
//! that hit it.

use thiserror::Error;

/// Errors that can occur in the procedural system.
#[derive(Error, Debug)]
pub enum NoiseError {
    /// `next_int` was asked for a non-positive bound.
    #[error("invalid bound {0}: must be positive")]
    InvalidBound(i32),

    /// A settings vector was shorter than the constructor requires.
    #[error("settings vector too short: need {required} values, got {provided}")]
    MissingSettings {
        /// Number of values the constructor reads.
        required: usize,
        /// Number of values supplied.
        provided: usize,
    },

    /// An octave set must contain at least one octave.
    #[error("invalid octave count {0}: must be at least 1")]
    InvalidOctaveCount(u32),

    /// A base scale that is zero, negative or not finite.
    #[error("invalid scale {0}: must be finite and positive")]
    InvalidScale(f64),

    /// A zoom factor that is zero, negative or not finite.
    #[error("invalid zoom {0}: must be finite and positive")]
    InvalidZoom(f64),

    /// Integer zoom for the grid provider.
    #[error("invalid grid zoom {0}: must be positive")]
    InvalidGridZoom(i64),

    /// NaN or infinite query coordinate.
    #[error("non-finite coordinate ({x}, {y}, {z})")]
    NonFiniteCoordinate {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Z coordinate (0 for 2D queries).
        z: f64,
    },

    /// Settings file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

impl NoiseError {
    /// Returns true for malformed construction parameters.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        !self.is_domain()
    }

    /// Returns true for numeric edge cases in query coordinates.
    #[must_use]
    pub const fn is_domain(&self) -> bool {
        matches!(self, Self::NonFiniteCoordinate { .. })
    }
}

/// Result type for procedural operations.
pub type NoiseResult<T> = Result<T, NoiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(NoiseError::InvalidBound(0).is_configuration());
        assert!(NoiseError::MissingSettings { required: 3, provided: 1 }.is_configuration());
        assert!(NoiseError::InvalidZoom(0.0).is_configuration());

        let domain = NoiseError::NonFiniteCoordinate { x: f64::NAN, y: 0.0, z: 0.0 };
        assert!(domain.is_domain());
        assert!(!domain.is_configuration());
    }

    #[test]
    fn test_messages() {
        let err = NoiseError::MissingSettings { required: 3, provided: 2 };
        assert_eq!(err.to_string(), "settings vector too short: need 3 values, got 2");
        assert_eq!(NoiseError::InvalidBound(-4).to_string(), "invalid bound -4: must be positive");
    }
}
