//! Conversion of physical coordinates into record positions.
//!
//! Records are stored in a flat table in C-style ordering over the spatial
//! axes followed by the component axis, so the component varies fastest:
//! `((i0 * n1 + i1) * n2 + i2) * ncomponents + ig`. This ordering is the
//! storage layout of the table and must not change.
//!
//! [`RegularIndex`] does the arithmetic for any axis count; [`IndexEngine`]
//! selects the instantiation for each supported grid topology.
use smallvec::SmallVec;

use crate::error::{ConfigError, LookupError};

pub mod regular;

pub use regular::RegularIndex;

/// Distance (in units of grid steps) below which a coordinate is treated
/// as lying exactly on a node during vicinity lookups.
pub const VICINITY_EPS: f64 = 1e-5;

/// Record indices and interpolation weights for one vicinity lookup.
///
/// Holds up to 2^3 entries inline, which covers trilinear interpolation.
pub type Vicinity<T> = SmallVec<[(usize, T); 8]>;

/// Populate the cumulative product of higher dimensions for indexing,
/// with the component axis folded in as the fastest-varying one.
///
/// Each entry is the stride between blocks relating to a given index along
/// each dimension. Also returns the total number of records.
/// Returns `None` if the record count overflows.
pub(crate) fn dimprod<const NDIMS: usize>(
    dims: &[usize; NDIMS],
    ncomponents: usize,
) -> Option<([usize; NDIMS], usize)> {
    let mut dimprod = [1_usize; NDIMS];
    let mut acc = ncomponents;
    for i in (0..NDIMS).rev() {
        dimprod[i] = acc;
        acc = acc.checked_mul(dims[i])?;
    }
    Some((dimprod, acc))
}

/// Row-major flattening of per-axis node indices and a component id.
#[inline(always)]
pub(crate) fn ravel<const NDIMS: usize>(
    dimprod: &[usize; NDIMS],
    idx: &[usize; NDIMS],
    ig: usize,
) -> usize {
    (0..NDIMS).fold(ig, |k, j| k + dimprod[j] * idx[j])
}

fn as_point<const NDIMS: usize>(x: &[f64]) -> Result<&[f64; NDIMS], LookupError> {
    x.try_into().map_err(|_| LookupError::DimensionMismatch {
        expected: NDIMS,
        found: x.len(),
    })
}

/// Lookup engine for one grid topology, closed over a frozen snapshot of the
/// grid's starts, steps, node counts and component count.
///
/// Coordinates are always passed in declared axis order:
/// * `TypeA`: `(source_depth, distance)`
/// * `TypeB`: `(receiver_depth, source_depth, distance)`
#[derive(Clone, Debug, PartialEq)]
pub enum IndexEngine {
    TypeA(RegularIndex<f64, 2>),
    TypeB(RegularIndex<f64, 3>),
}

impl IndexEngine {
    /// Engine for the two-axis topology.
    pub fn type_a(
        starts: [f64; 2],
        steps: [f64; 2],
        dims: [usize; 2],
        ncomponents: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self::TypeA(RegularIndex::new(starts, steps, dims, ncomponents)?))
    }

    /// Engine for the three-axis topology.
    pub fn type_b(
        starts: [f64; 3],
        steps: [f64; 3],
        dims: [usize; 3],
        ncomponents: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self::TypeB(RegularIndex::new(starts, steps, dims, ncomponents)?))
    }

    /// Number of spatial axes.
    pub fn ndims(&self) -> usize {
        match self {
            Self::TypeA(_) => 2,
            Self::TypeB(_) => 3,
        }
    }

    pub fn ncomponents(&self) -> usize {
        match self {
            Self::TypeA(idx) => idx.ncomponents(),
            Self::TypeB(idx) => idx.ncomponents(),
        }
    }

    pub fn nrecords(&self) -> usize {
        match self {
            Self::TypeA(idx) => idx.nrecords(),
            Self::TypeB(idx) => idx.nrecords(),
        }
    }

    /// Record index of the grid node nearest to `x`, for component `ig`.
    ///
    /// # Errors
    /// * `DimensionMismatch` if `x` does not hold one coordinate per spatial axis
    /// * `OutOfBounds` if the nearest node or the component is off the grid
    pub fn exact(&self, x: &[f64], ig: usize) -> Result<usize, LookupError> {
        match self {
            Self::TypeA(idx) => idx.exact(as_point(x)?, ig),
            Self::TypeB(idx) => idx.exact(as_point(x)?, ig),
        }
    }

    /// Element-wise [`exact`](Self::exact) over one coordinate array per
    /// spatial axis plus an array of component ids, all of equal length.
    ///
    /// Fails as a whole if any element is out of bounds, reporting the
    /// position of the first such element.
    pub fn batch(&self, obs: &[&[f64]], igs: &[usize]) -> Result<Vec<usize>, LookupError> {
        match self {
            Self::TypeA(idx) => idx.batch(obs, igs),
            Self::TypeB(idx) => idx.batch(obs, igs),
        }
    }

    /// Records bracketing `x` and their multilinear interpolation weights.
    ///
    /// # Errors
    /// * `DimensionMismatch` if `x` does not hold one coordinate per spatial axis
    /// * `OutOfBounds` if a bracketing node or the component is off the grid
    pub fn vicinity(&self, x: &[f64], ig: usize) -> Result<Vicinity<f64>, LookupError> {
        match self {
            Self::TypeA(idx) => idx.vicinity(as_point(x)?, ig),
            Self::TypeB(idx) => idx.vicinity(as_point(x)?, ig),
        }
    }
}
