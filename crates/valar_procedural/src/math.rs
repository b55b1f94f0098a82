//! Lattice arithmetic shared by the noise fields.

use crate::error::{NoiseError, NoiseResult};

/// Fast floor function for the simplex skew.
///
/// Faster than `f64::floor()` for our use case. Saturates at the `i32`
/// range.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi.saturating_sub(1)
    } else {
        xi
    }
}

/// Cellular lattice floor.
///
/// Differs from `f64::floor` at zero and negative integers, where it
/// returns one less. [`frac`] measures face distances against this cell
/// assignment, so the two must be used together.
///
/// Saturates at the `i64` range.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn lattice_floor(n: f64) -> i64 {
    if n > 0.0 {
        n as i64
    } else {
        (n as i64).saturating_sub(1)
    }
}

/// Sign-aware fractional part: `frac(-n) == frac(n)`.
#[inline]
#[must_use]
pub fn frac(n: f64) -> f64 {
    let n = n.abs();
    n - n.trunc()
}

/// Logistic curve `scale / (1 + e^(-(input + x_offset) * x_scale)) + offset`.
///
/// Used to squash unbounded noise sums into a band.
#[inline]
#[must_use]
pub fn sigmoid(input: f64, scale: f64, offset: f64, x_scale: f64, x_offset: f64) -> f64 {
    scale * (1.0 / (1.0 + (-((input + x_offset) * x_scale)).exp())) + offset
}

/// Rejects NaN or infinite query coordinates.
///
/// # Errors
///
/// Returns [`NoiseError::NonFiniteCoordinate`] if any component is not finite.
#[inline]
pub fn check_finite(x: f64, y: f64, z: f64) -> NoiseResult<()> {
    if x.is_finite() && y.is_finite() && z.is_finite() {
        Ok(())
    } else {
        Err(NoiseError::NonFiniteCoordinate { x, y, z })
    }
}
