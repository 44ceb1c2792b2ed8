//! Record indexing and multilinear weights on a regular grid.
//!
//! Each spatial axis is described by a start, a (possibly negative) step
//! and a node count; the trailing component axis by its size alone.
//!
//! Exact lookups round each fractional grid position to the nearest node,
//! with ties rounded away from zero. Vicinity lookups resolve each axis to
//! either a single node (when within [`VICINITY_EPS`] of one) or the two
//! nodes bracketing the coordinate, and take the cross product over axes,
//! which gives bilinear weights for two axes and trilinear for three.
//! Nothing is ever clamped or extrapolated: a coordinate that has no valid
//! node(s) on the grid is rejected.
//!
//! ```rust
//! use gfgrid::index::RegularIndex;
//!
//! // Source depth 0..10 step 5, distance 100..200 step 50, two components
//! let idx = RegularIndex::new([0.0, 100.0], [5.0, 50.0], [3, 3], 2).unwrap();
//!
//! assert_eq!(idx.exact(&[5.0, 150.0], 1).unwrap(), 9);
//!
//! let weights = idx.vicinity(&[2.5, 150.0], 1).unwrap();
//! assert_eq!(&weights[..], &[(3, 0.5), (9, 0.5)]);
//! ```
use num_traits::{Float, NumCast};
use smallvec::smallvec;

use super::{dimprod, ravel, Vicinity, VICINITY_EPS};
use crate::error::{ConfigError, LookupError};

/// Batches at least this long are split across threads.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 4096;

/// Resolution of one coordinate along one axis for a vicinity lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Bracket<T> {
    /// Coordinate sits on a node.
    Node(usize),
    /// Coordinate lies between `lower` and `lower + 1`,
    /// at fractional distance `frac` from `lower`.
    Cell { lower: usize, frac: T },
}

/// Record indexing on a regular grid with `NDIMS` spatial axes and a
/// trailing component axis.
///
/// Immutable once built; all lookups take `&self` and touch no shared
/// mutable state, so one instance can serve any number of threads.
#[derive(Clone, Debug, PartialEq)]
pub struct RegularIndex<T: Float, const NDIMS: usize> {
    /// Coordinate of the first node on each axis
    starts: [T; NDIMS],

    /// Step between nodes on each axis
    steps: [T; NDIMS],

    /// Number of nodes on each axis
    dims: [usize; NDIMS],

    /// Size of the component axis
    ncomponents: usize,

    /// Row-major stride of each axis, component axis folded in
    dimprod: [usize; NDIMS],

    /// Total number of records
    nrecords: usize,

    /// On-node tolerance in units of grid steps
    eps: T,
}

impl<T: Float, const NDIMS: usize> RegularIndex<T, NDIMS> {
    /// Build a new index, using O(NDIMS) calculations and storage.
    ///
    /// Unlike interpolators that need a full cell, axes with a single node
    /// are allowed; vicinity lookups on such an axis succeed only on the node.
    ///
    /// # Errors
    /// * If there are no components
    /// * If any start or step is not finite, or any step is zero
    /// * If any axis has no nodes
    /// * If the record count overflows `usize`
    pub fn new(
        starts: [T; NDIMS],
        steps: [T; NDIMS],
        dims: [usize; NDIMS],
        ncomponents: usize,
    ) -> Result<Self, ConfigError> {
        if ncomponents == 0 {
            return Err(ConfigError::NoComponents);
        }
        for j in 0..NDIMS {
            if !(starts[j].is_finite() && steps[j].is_finite()) {
                return Err(ConfigError::NonFinite {
                    axis: format!("axis {j}"),
                });
            }
            if steps[j] == T::zero() {
                return Err(ConfigError::ZeroDelta {
                    axis: format!("axis {j}"),
                });
            }
            if dims[j] == 0 {
                return Err(ConfigError::EmptyAxis {
                    axis: format!("axis {j}"),
                    count: 0,
                });
            }
        }

        let (dimprod, nrecords) =
            dimprod(&dims, ncomponents).ok_or(ConfigError::TooManyRecords)?;

        Ok(Self {
            starts,
            steps,
            dims,
            ncomponents,
            dimprod,
            nrecords,
            eps: <T as NumCast>::from(VICINITY_EPS).unwrap_or_else(T::epsilon),
        })
    }

    /// Number of nodes on each spatial axis.
    pub fn dims(&self) -> &[usize; NDIMS] {
        &self.dims
    }

    pub fn ncomponents(&self) -> usize {
        self.ncomponents
    }

    /// Total number of records, `ncomponents * prod(dims)`.
    pub fn nrecords(&self) -> usize {
        self.nrecords
    }

    /// Record index of the grid node nearest to `x`, for component `ig`.
    ///
    /// # Errors
    /// * `OutOfBounds` if the nearest node on any axis is off the grid,
    ///   if a coordinate is not finite, or if `ig >= ncomponents`
    #[inline]
    pub fn exact(&self, x: &[T; NDIMS], ig: usize) -> Result<usize, LookupError> {
        self.check_component(ig)?;
        let mut idx = [0_usize; NDIMS];
        for j in 0..NDIMS {
            idx[j] = self.nearest(x[j], j)?;
        }
        Ok(ravel(&self.dimprod, &idx, ig))
    }

    /// Element-wise [`exact`](Self::exact) on a contiguous list of observation points,
    /// given as one coordinate slice per axis plus a slice of component ids.
    ///
    /// No partial results: if any element is out of bounds, the whole batch fails
    /// and the error carries the position of the first such element.
    ///
    /// # Errors
    /// * `DimensionMismatch` if there is not one slice per axis,
    ///   or if the slices differ in length
    /// * `OutOfBounds` as for [`exact`](Self::exact)
    pub fn batch(&self, obs: &[&[T]], igs: &[usize]) -> Result<Vec<usize>, LookupError>
    where
        T: Send + Sync,
    {
        // Make sure there are enough coordinate inputs for each dimension
        if obs.len() != NDIMS {
            return Err(LookupError::DimensionMismatch {
                expected: NDIMS,
                found: obs.len(),
            });
        }
        // Make sure the size of inputs match
        let n = igs.len();
        if let Some(bad) = obs.iter().find(|xx| xx.len() != n) {
            return Err(LookupError::DimensionMismatch {
                expected: n,
                found: bad.len(),
            });
        }

        let eval = |i: usize| {
            let x: [T; NDIMS] = core::array::from_fn(|j| obs[j][i]);
            self.exact(&x, igs[i])
                .map_err(|_| LookupError::OutOfBounds { element: Some(i) })
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            if n >= PARALLEL_THRESHOLD {
                // Gather every result before scanning so the reported
                // element is the first one, as in the serial path
                let results: Vec<Result<usize, LookupError>> =
                    (0..n).into_par_iter().map(eval).collect();
                return results
                    .into_iter()
                    .collect::<Result<Vec<_>, _>>()
                    .inspect_err(|e| tracing::debug!(error = %e, "batch lookup rejected"));
            }
        }

        (0..n)
            .map(eval)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| tracing::debug!(error = %e, "batch lookup rejected"))
    }

    /// Record indices of the nodes surrounding `x`, for component `ig`,
    /// with their multilinear interpolation weights.
    ///
    /// Axes where `x` is within [`VICINITY_EPS`] steps of a node contribute that
    /// node alone; other axes contribute the two bracketing nodes. Entries are
    /// ordered with the first axis varying slowest, lower node first, and their
    /// weights sum to one.
    ///
    /// # Errors
    /// * `OutOfBounds` if any bracketing node is off the grid,
    ///   if a coordinate is not finite, or if `ig >= ncomponents`
    pub fn vicinity(&self, x: &[T; NDIMS], ig: usize) -> Result<Vicinity<T>, LookupError> {
        let mut brackets = [Bracket::Node(0); NDIMS];
        for j in 0..NDIMS {
            brackets[j] = self.bracket(x[j], j)?;
        }
        self.check_component(ig)?;

        let mut out: Vicinity<T> = smallvec![(ig, T::one())];
        for j in 0..NDIMS {
            let stride = self.dimprod[j];
            match brackets[j] {
                Bracket::Node(i) => out.iter_mut().for_each(|(k, _)| *k += stride * i),
                Bracket::Cell { lower, frac } => {
                    let mut split = Vicinity::with_capacity(2 * out.len());
                    for &(k, w) in out.iter() {
                        split.push((k + stride * lower, w * (T::one() - frac)));
                        split.push((k + stride * (lower + 1), w * frac));
                    }
                    out = split;
                }
            }
        }

        Ok(out)
    }

    #[inline(always)]
    fn check_component(&self, ig: usize) -> Result<(), LookupError> {
        if ig < self.ncomponents {
            Ok(())
        } else {
            Err(LookupError::OUT_OF_BOUNDS)
        }
    }

    /// Fractional position of `v` along this dimension, in units of steps.
    #[inline(always)]
    fn floc(&self, v: T, dim: usize) -> T {
        (v - self.starts[dim]) / self.steps[dim]
    }

    /// Nearest node to `v` along this dimension.
    #[inline(always)]
    fn nearest(&self, v: T, dim: usize) -> Result<usize, LookupError> {
        node_in(self.floc(v, dim).round(), self.dims[dim])
    }

    #[inline]
    fn bracket(&self, v: T, dim: usize) -> Result<Bracket<T>, LookupError> {
        let floc = self.floc(v, dim);

        let r = floc.round();
        if (r - floc).abs() < self.eps {
            return Ok(Bracket::Node(node_in(r, self.dims[dim])?));
        }

        // The upper node is on the grid only if the lower one is below the last node
        let f = floc.floor();
        let lower = node_in(f, self.dims[dim] - 1)?;
        Ok(Bracket::Cell {
            lower,
            frac: floc - f,
        })
    }
}

/// Convert an integral float to an index in `[0, n)`.
#[inline(always)]
fn node_in<T: Float>(v: T, n: usize) -> Result<usize, LookupError> {
    // NaN and infinities are unrepresentable and land here too
    let i = <isize as NumCast>::from(v).ok_or(LookupError::OUT_OF_BOUNDS)?;
    if i < 0 || i as usize >= n {
        return Err(LookupError::OUT_OF_BOUNDS);
    }
    Ok(i as usize)
}

#[cfg(test)]
mod test {
    use super::RegularIndex;
    use crate::error::LookupError;
    use crate::testing::*;
    use crate::utils::*;
    use ndarray::{Array3, Array4};
    use proptest::prelude::*;

    /// Source depth 0..10 step 5, distance 100..200 step 50, two components
    fn scenario() -> RegularIndex<f64, 2> {
        RegularIndex::new([0.0, 100.0], [5.0, 50.0], [3, 3], 2).unwrap()
    }

    fn weight_sum(v: &[(usize, f64)]) -> f64 {
        v.iter().map(|(_, w)| w).sum()
    }

    #[test]
    fn test_exact_scenario() {
        let idx = scenario();
        assert_eq!(idx.nrecords(), 18);
        assert_eq!(idx.exact(&[5.0, 150.0], 1), Ok((1 * 3 + 1) * 2 + 1));
        assert_eq!(idx.exact(&[0.0, 100.0], 0), Ok(0));
        assert_eq!(idx.exact(&[10.0, 200.0], 1), Ok(17));

        // Nearest node, ties away from zero
        assert_eq!(idx.exact(&[6.0, 160.0], 0), idx.exact(&[5.0, 150.0], 0));
        assert_eq!(idx.exact(&[2.5, 100.0], 0), idx.exact(&[5.0, 100.0], 0));
        assert_eq!(idx.exact(&[7.5, 100.0], 0), idx.exact(&[10.0, 100.0], 0));
    }

    #[test]
    fn test_vicinity_scenario() {
        let idx = scenario();
        let depth0 = idx.exact(&[0.0, 150.0], 1).unwrap();
        let depth5 = idx.exact(&[5.0, 150.0], 1).unwrap();

        let v = idx.vicinity(&[2.5, 150.0], 1).unwrap();
        assert_eq!(&v[..], &[(depth0, 0.5), (depth5, 0.5)]);

        // On a node in every axis
        let v = idx.vicinity(&[5.0, 150.0], 1).unwrap();
        assert_eq!(&v[..], &[(depth5, 1.0)]);

        // Within tolerance of a node snaps to it
        let v = idx.vicinity(&[5.0 + 1e-6, 150.0 - 1e-5], 1).unwrap();
        assert_eq!(&v[..], &[(depth5, 1.0)]);
    }

    #[test]
    fn test_vicinity_bilinear() {
        let idx = scenario();
        let v = idx.vicinity(&[1.0, 175.0], 0).unwrap();
        assert_eq!(v.len(), 4);

        // First axis varies slowest, lower node first
        let expected = [
            (idx.exact(&[0.0, 150.0], 0).unwrap(), 0.8 * 0.5),
            (idx.exact(&[0.0, 200.0], 0).unwrap(), 0.8 * 0.5),
            (idx.exact(&[5.0, 150.0], 0).unwrap(), 0.2 * 0.5),
            (idx.exact(&[5.0, 200.0], 0).unwrap(), 0.2 * 0.5),
        ];
        for ((k, w), (ke, we)) in v.iter().zip(expected.iter()) {
            assert_eq!(k, ke);
            assert!((w - we).abs() < 1e-12);
        }
        assert!((weight_sum(&v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_vicinity_trilinear() {
        let idx: RegularIndex<f64, 3> =
            RegularIndex::new([0.0, 0.0, 100.0], [1.0, 5.0, 50.0], [2, 3, 3], 3).unwrap();
        let v = idx.vicinity(&[0.25, 2.5, 125.0], 2).unwrap();
        assert_eq!(v.len(), 8);
        assert!((weight_sum(&v) - 1.0).abs() < 1e-9);
        assert_eq!(v[0].0, idx.exact(&[0.0, 0.0, 100.0], 2).unwrap());
        assert_eq!(v[7].0, idx.exact(&[1.0, 5.0, 150.0], 2).unwrap());
        assert!((v[0].1 - 0.75 * 0.5 * 0.5).abs() < 1e-12);

        // One axis on a node collapses that axis's branching
        let v = idx.vicinity(&[1.0, 2.5, 125.0], 2).unwrap();
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_bounds() {
        let idx = scenario();
        let oob: Result<(), LookupError> = Err(LookupError::OUT_OF_BOUNDS);

        // Just below node 0: no bracketing pair exists, though rounding lands on node 0
        assert_eq!(idx.vicinity(&[-5.0 * 0.4, 150.0], 0).map(|_| ()), oob);
        assert_eq!(idx.exact(&[-5.0 * 0.4, 150.0], 0), Ok(2));
        assert_eq!(idx.exact(&[-5.0 * 0.6, 150.0], 0).map(|_| ()), oob);

        // One step past the last node
        assert_eq!(idx.exact(&[15.0, 150.0], 0).map(|_| ()), oob);
        assert_eq!(idx.vicinity(&[15.0, 150.0], 0).map(|_| ()), oob);
        assert_eq!(idx.exact(&[5.0, 250.0], 0).map(|_| ()), oob);

        // Between the last node and beyond
        assert_eq!(idx.vicinity(&[11.0, 150.0], 0).map(|_| ()), oob);

        // Component axis
        assert_eq!(idx.exact(&[5.0, 150.0], 2).map(|_| ()), oob);
        assert_eq!(idx.vicinity(&[5.0, 150.0], 2).map(|_| ()), oob);

        // Unrepresentable coordinates
        assert_eq!(idx.exact(&[f64::NAN, 150.0], 0).map(|_| ()), oob);
        assert_eq!(idx.vicinity(&[5.0, f64::INFINITY], 0).map(|_| ()), oob);
    }

    #[test]
    fn test_single_node_axis() {
        let idx: RegularIndex<f64, 2> =
            RegularIndex::new([10.0, 0.0], [1.0, 1.0], [1, 4], 1).unwrap();
        assert_eq!(idx.exact(&[10.0, 3.0], 0), Ok(3));
        assert_eq!(idx.vicinity(&[10.0, 2.5], 0).unwrap().len(), 2);
        assert!(idx.vicinity(&[10.5, 2.0], 0).is_err());
    }

    #[test]
    fn test_negative_step() {
        // Distance axis running from 200 down to 100
        let idx: RegularIndex<f64, 2> =
            RegularIndex::new([0.0, 200.0], [5.0, -50.0], [3, 3], 1).unwrap();
        assert_eq!(idx.exact(&[0.0, 200.0], 0), Ok(0));
        assert_eq!(idx.exact(&[0.0, 100.0], 0), Ok(2));
        let v = idx.vicinity(&[0.0, 175.0], 0).unwrap();
        assert_eq!(&v[..], &[(0, 0.5), (1, 0.5)]);
    }

    #[test]
    fn test_new_rejects() {
        assert!(RegularIndex::<f64, 2>::new([0.0, 0.0], [1.0, 0.0], [2, 2], 1).is_err());
        assert!(RegularIndex::<f64, 2>::new([0.0, 0.0], [1.0, 1.0], [2, 0], 1).is_err());
        assert!(RegularIndex::<f64, 2>::new([0.0, 0.0], [1.0, 1.0], [2, 2], 0).is_err());
        assert!(RegularIndex::<f64, 2>::new([f64::NAN, 0.0], [1.0, 1.0], [2, 2], 1).is_err());
        assert!(
            RegularIndex::<f64, 2>::new([0.0, 0.0], [1.0, 1.0], [usize::MAX, 2], 1).is_err()
        );
    }

    #[test]
    fn test_f32() {
        let idx: RegularIndex<f32, 2> =
            RegularIndex::new([0.0, 100.0], [5.0, 50.0], [3, 3], 2).unwrap();
        assert_eq!(idx.exact(&[5.0, 150.0], 1), Ok(9));
        let v = idx.vicinity(&[2.5, 150.0], 1).unwrap();
        assert_eq!(v.len(), 2);
        assert!((v[0].1 + v[1].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_batch() {
        let idx = scenario();
        let depths = [0.0, 5.0, 10.0, 5.0];
        let dists = [100.0, 150.0, 200.0, 160.0];
        let igs = [0, 1, 1, 0];
        let out = idx.batch(&[&depths[..], &dists[..]], &igs).unwrap();
        for i in 0..4 {
            assert_eq!(out[i], idx.exact(&[depths[i], dists[i]], igs[i]).unwrap());
        }

        // Whole batch fails on the first bad element
        let depths = [0.0, 50.0, 10.0, -20.0];
        assert_eq!(
            idx.batch(&[&depths[..], &dists[..]], &igs),
            Err(LookupError::OutOfBounds { element: Some(1) })
        );
        let igs_bad = [0, 1, 1, 2];
        let depths = [0.0, 5.0, 10.0, 5.0];
        assert_eq!(
            idx.batch(&[&depths[..], &dists[..]], &igs_bad),
            Err(LookupError::OutOfBounds { element: Some(3) })
        );

        // Shape checks
        assert_eq!(
            idx.batch(&[&depths[..]], &igs),
            Err(LookupError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            idx.batch(&[&depths[..], &dists[..3]], &igs),
            Err(LookupError::DimensionMismatch {
                expected: 4,
                found: 3
            })
        );

        // Empty batch is valid
        let empty: [f64; 0] = [];
        assert_eq!(idx.batch(&[&empty[..], &empty[..]], &[]), Ok(vec![]));
    }

    #[test]
    fn test_batch_large() {
        // Large enough to cross the threshold for splitting across threads
        let idx = scenario();
        let n = 10_000;
        let depths: Vec<f64> = (0..n).map(|i| 5.0 * (i % 3) as f64).collect();
        let dists: Vec<f64> = (0..n).map(|i| 100.0 + 50.0 * ((i / 3) % 3) as f64).collect();
        let igs: Vec<usize> = (0..n).map(|i| i % 2).collect();
        let out = idx.batch(&[&depths[..], &dists[..]], &igs).unwrap();
        assert_eq!(out.len(), n);
        for i in (0..n).step_by(97) {
            assert_eq!(out[i], idx.exact(&[depths[i], dists[i]], igs[i]).unwrap());
        }

        let mut depths = depths;
        depths[7000] = 1e6;
        depths[9000] = -1e6;
        assert_eq!(
            idx.batch(&[&depths[..], &dists[..]], &igs),
            Err(LookupError::OutOfBounds {
                element: Some(7000)
            })
        );
    }

    /// The flat index of every node must match the position of that node in a
    /// C-ordered array with the component axis last.
    #[test]
    fn test_matches_c_order_layout() {
        let (na, nb, ng) = (4, 5, 3);
        let a = linspace(0.0, 30.0, na);
        let b = linspace(10.0, 50.0, nb);
        let idx: RegularIndex<f64, 2> =
            RegularIndex::new([0.0, 10.0], [10.0, 10.0], [na, nb], ng).unwrap();
        let layout =
            Array3::from_shape_vec((na, nb, ng), (0..na * nb * ng).collect::<Vec<usize>>())
                .unwrap();
        for ia in 0..na {
            for ib in 0..nb {
                for ig in 0..ng {
                    assert_eq!(idx.exact(&[a[ia], b[ib]], ig).unwrap(), layout[[ia, ib, ig]]);
                }
            }
        }

        let (nr, ns, nd, ng) = (2, 3, 4, 5);
        let idx: RegularIndex<f64, 3> =
            RegularIndex::new([0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [nr, ns, nd], ng).unwrap();
        let n = nr * ns * nd * ng;
        let layout =
            Array4::from_shape_vec((nr, ns, nd, ng), (0..n).collect::<Vec<usize>>()).unwrap();
        let nodes = meshgrid(vec![
            &linspace(0.0, 1.0, nr),
            &linspace(0.0, 4.0, ns),
            &linspace(0.0, 9.0, nd),
        ]);
        for (i, node) in nodes.iter().enumerate() {
            let (ir, is, id) = (i / (ns * nd), (i / nd) % ns, i % nd);
            for ig in 0..ng {
                let k = idx.exact(&[node[0], node[1], node[2]], ig).unwrap();
                assert_eq!(k, layout[[ir, is, id, ig]]);
                assert!(k < idx.nrecords());
            }
        }
    }

    #[test]
    fn test_weight_conservation_random() {
        let mut rng = rng_fixed_seed();
        let idx: RegularIndex<f64, 3> =
            RegularIndex::new([0.0, 0.0, 100.0], [1.0, 5.0, 50.0], [5, 6, 7], 2).unwrap();
        let r = random_points(&mut rng, 1000, 0.0, 4.0);
        let s = random_points(&mut rng, 1000, 0.0, 25.0);
        let d = random_points(&mut rng, 1000, 100.0, 400.0);
        for i in 0..1000 {
            let v = idx.vicinity(&[r[i], s[i], d[i]], 1).unwrap();
            assert!((weight_sum(&v) - 1.0).abs() < 1e-9);
            assert!(v.iter().all(|&(k, w)| k < idx.nrecords() && w >= 0.0));
        }
    }

    proptest! {
        #[test]
        fn node_round_trip(
            na in 1usize..20,
            nb in 1usize..20,
            ng in 1usize..4,
            ia in 0usize..20,
            ib in 0usize..20,
            ig in 0usize..4,
            start_a in -100.0f64..100.0,
            step_a in 0.1f64..10.0,
        ) {
            let (ia, ib, ig) = (ia % na, ib % nb, ig % ng);
            let idx: RegularIndex<f64, 2> =
                RegularIndex::new([start_a, 100.0], [step_a, 50.0], [na, nb], ng).unwrap();
            let x = [start_a + step_a * ia as f64, 100.0 + 50.0 * ib as f64];

            let k = idx.exact(&x, ig).unwrap();
            prop_assert_eq!(k, (ia * nb + ib) * ng + ig);
            prop_assert!(k < idx.nrecords());

            let v = idx.vicinity(&x, ig).unwrap();
            prop_assert_eq!(&v[..], &[(k, 1.0)]);

            // Idempotent
            prop_assert_eq!(idx.exact(&x, ig), Ok(k));
            prop_assert_eq!(idx.vicinity(&x, ig).unwrap(), v);
        }

        #[test]
        fn weights_sum_to_one(
            fa in 0.0f64..1.0,
            fb in 0.0f64..1.0,
            fc in 0.0f64..1.0,
        ) {
            let idx: RegularIndex<f64, 3> =
                RegularIndex::new([0.0, 0.0, 100.0], [1.0, 5.0, 50.0], [3, 4, 5], 2).unwrap();
            let x = [2.0 * fa, 15.0 * fb, 100.0 + 200.0 * fc];
            let v = idx.vicinity(&x, 0).unwrap();
            prop_assert!((weight_sum(&v) - 1.0).abs() < 1e-9);
            prop_assert!(v.iter().all(|&(k, _)| k < idx.nrecords()));
        }
    }
}
