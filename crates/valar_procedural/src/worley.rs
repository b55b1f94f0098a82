//! # Worley Noise
//!
//! Cellular noise: the distance from a query point to the nearest of a set
//! of points scattered one per unit voxel.
//!
//! No point is ever stored. The point owned by voxel `(i, j, k)` is
//! regenerated on demand by reseeding a [`SeededStream`] from the seed and
//! the voxel coordinate and drawing three unit doubles.
//!
//! ## Search Order
//!
//! The search visits the query's own voxel, then the six face neighbours
//! (`+x, -x, +y, -y, +z, -z`), then the remaining twenty neighbours in
//! `i, j, k` nested order. A neighbour is only visited when a lower bound
//! on its distance beats the best distance so far. This order decides which
//! floating-point operations run and must not be rearranged.

use crate::math::{frac, lattice_floor};
use crate::mixer::{
    RandomSource, SeededStream, CELL_X_MULTIPLIER, CELL_Y_MULTIPLIER, CELL_Z_MULTIPLIER,
};
use crate::noise::NoiseGenerator;
use crate::seed::WorldSeed;

/// Offset applied to every query so points on negative lattice planes do
/// not sit exactly on a voxel boundary.
const BOUNDARY_NUDGE: f64 = 1e-7;

/// A point in three dimensional space.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Point {
    x: f64,
    y: f64,
    z: f64,
}

impl Point {
    /// Squared distance; the square root is taken once at the end.
    #[inline]
    fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// The canonical point of one lattice voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelCellPoint {
    /// Integer voxel coordinate.
    pub cell: [i64; 3],
    /// Offset of the point inside the voxel, each component in `[0, 1)`.
    pub offset: [f64; 3],
}

impl VoxelCellPoint {
    /// Absolute position of the point.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn position(&self) -> [f64; 3] {
        [
            self.cell[0] as f64 + self.offset[0],
            self.cell[1] as f64 + self.offset[1],
            self.cell[2] as f64 + self.offset[2],
        ]
    }
}

/// Steve Worley's cellular noise, one point per voxel.
///
/// Voxel coordinates saturate at the `i64` range: beyond it every query
/// measures against the edge voxels.
///
/// Instances are immutable and may be shared across threads; each query
/// uses a stack-local stream.
///
/// # Example
///
/// ```rust
/// use valar_procedural::{NoiseGenerator, WorldSeed, WorleyNoise};
///
/// let noise = WorleyNoise::new(WorldSeed::new(3));
/// let distance = noise.eval_3d(0.5, 1.5, -2.5);
/// assert!(distance >= 0.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct WorleyNoise {
    seed: WorldSeed,
}

impl WorleyNoise {
    /// Creates a new noise instance with the specified seed value.
    #[must_use]
    pub const fn new(seed: WorldSeed) -> Self {
        Self { seed }
    }

    /// Creates a new noise instance with a random seed value.
    #[must_use]
    pub fn random() -> Self {
        Self::new(WorldSeed::random())
    }

    /// Returns the canonical point owned by voxel `(x, y, z)`.
    #[must_use]
    pub fn cell_point(&self, x: i64, y: i64, z: i64) -> VoxelCellPoint {
        let mut stream = SeededStream::new(0);
        self.cell_point_with(&mut stream, x, y, z)
    }

    #[inline]
    fn cell_point_with(&self, stream: &mut SeededStream, x: i64, y: i64, z: i64) -> VoxelCellPoint {
        stream.reseed(self.cell_seed(x, y, z));
        // Draw order is x, y, z.
        let ox = stream.next_double();
        let oy = stream.next_double();
        let oz = stream.next_double();
        VoxelCellPoint {
            cell: [x, y, z],
            offset: [ox, oy, oz],
        }
    }

    #[inline]
    const fn cell_seed(&self, x: i64, y: i64, z: i64) -> i64 {
        self.seed.value()
            ^ x.wrapping_mul(CELL_X_MULTIPLIER)
            ^ y.wrapping_mul(CELL_Y_MULTIPLIER)
            ^ z.wrapping_mul(CELL_Z_MULTIPLIER)
    }

    /// Visits one voxel and returns the smaller of `best` and the squared
    /// distance from `p` to the voxel's point.
    #[inline]
    fn process_voxel(&self, stream: &mut SeededStream, p: Point, best: f64, x: i64, y: i64, z: i64) -> f64 {
        let [px, py, pz] = self.cell_point_with(stream, x, y, z).position();
        let distance = p.distance_squared(Point { x: px, y: py, z: pz });
        if distance < best {
            distance
        } else {
            best
        }
    }

    /// Distance from `origin` to the nearest voxel point.
    #[allow(clippy::similar_names)]
    fn minimum_distance(&self, origin: Point) -> f64 {
        let mut stream = SeededStream::new(0);

        let p = Point {
            x: origin.x + BOUNDARY_NUDGE,
            y: origin.y + BOUNDARY_NUDGE,
            z: origin.z + BOUNDARY_NUDGE,
        };
        let x = lattice_floor(p.x);
        let y = lattice_floor(p.y);
        let z = lattice_floor(p.z);

        // Own voxel first.
        let mut s = self.process_voxel(&mut stream, p, f64::MAX, x, y, z);

        // Squared distances to the six faces of the own voxel.
        let (dpx2, dnx2) = face_distances(p.x);
        let (dpy2, dny2) = face_distances(p.y);
        let (dpz2, dnz2) = face_distances(p.z);

        if dpx2 < s {
            s = self.process_voxel(&mut stream, p, s, x.saturating_add(1), y, z);
        }
        if dnx2 < s {
            s = self.process_voxel(&mut stream, p, s, x.saturating_sub(1), y, z);
        }
        if dpy2 < s {
            s = self.process_voxel(&mut stream, p, s, x, y.saturating_add(1), z);
        }
        if dny2 < s {
            s = self.process_voxel(&mut stream, p, s, x, y.saturating_sub(1), z);
        }
        if dpz2 < s {
            s = self.process_voxel(&mut stream, p, s, x, y, z.saturating_add(1));
        }
        if dnz2 < s {
            s = self.process_voxel(&mut stream, p, s, x, y, z.saturating_sub(1));
        }

        // Edge and corner neighbours.
        for i in -1_i64..=1 {
            for j in -1_i64..=1 {
                for k in -1_i64..=1 {
                    if i.abs() + j.abs() + k.abs() <= 1 {
                        continue;
                    }

                    let bound = axis_bound(i, dnx2, dpx2)
                        + axis_bound(j, dny2, dpy2)
                        + axis_bound(k, dnz2, dpz2);

                    if bound < s {
                        let (ni, nj, nk) = (x.saturating_add(i), y.saturating_add(j), z.saturating_add(k));
                        s = self.process_voxel(&mut stream, p, s, ni, nj, nk);
                    }
                }
            }
        }

        s.sqrt()
    }
}

/// Squared distances from a coordinate to the `+` and `-` faces of its voxel.
#[inline]
fn face_distances(n: f64) -> (f64, f64) {
    let f = frac(n);
    if n >= 0.0 {
        (square(1.0 - f), square(f))
    } else {
        (square(f), square(1.0 - f))
    }
}

/// Face distance contributed by one axis of a neighbour offset.
#[inline]
fn axis_bound(offset: i64, negative: f64, positive: f64) -> f64 {
    match offset.signum() {
        -1 => negative,
        1 => positive,
        _ => 0.0,
    }
}

#[inline]
fn square(n: f64) -> f64 {
    n * n
}

impl NoiseGenerator for WorleyNoise {
    #[inline]
    fn eval_2d(&self, x: f64, y: f64) -> f64 {
        self.eval_3d(x, y, 0.0)
    }

    fn eval_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.minimum_distance(Point { x, y, z })
    }

    fn seed(&self) -> WorldSeed {
        self.seed
    }
}
