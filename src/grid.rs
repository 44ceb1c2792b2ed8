//! Regular grid definitions for Green's function stores.
//!
//! A [`GridConfig`] holds the scalar configuration handed over by the store's
//! metadata layer: per-axis bounds and steps for one of the supported
//! [`Layout`]s, the number of waveform components and an optional sample rate.
//! [`GridDefinition::build`] validates it and derives node counts, node
//! coordinates, the record count and the [`IndexEngine`] used for lookups.
//!
//! Definitions are immutable. Changing the configuration means building a new
//! definition, see [`GridDefinition::update`], so a lookup can never observe
//! derived fields that disagree with the configuration.
use std::ops::Range;

use itertools::Itertools;
use num_traits::NumCast;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LookupError};
use crate::index::{IndexEngine, Vicinity};
use crate::utils::linspace;

/// Bounds and node spacing of one grid axis.
///
/// `max` is reached from `min` in steps of `delta`, so a negative `delta`
/// describes an axis running from a larger `min` down to a smaller `max`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub delta: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64, delta: f64) -> Self {
        Self { min, max, delta }
    }

    /// Number of nodes on this axis, `round((max - min) / delta) + 1`.
    fn count(&self, axis: &str) -> Result<usize, ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite() && self.delta.is_finite()) {
            return Err(ConfigError::NonFinite { axis: axis.into() });
        }
        if self.delta == 0.0 {
            return Err(ConfigError::ZeroDelta { axis: axis.into() });
        }

        let n = ((self.max - self.min) / self.delta).round() + 1.0;
        if n < 1.0 {
            return Err(ConfigError::EmptyAxis {
                axis: axis.into(),
                count: n as i64,
            });
        }
        <usize as NumCast>::from(n).ok_or(ConfigError::TooManyRecords)
    }

    /// `n` evenly spaced node coordinates from `min` to `max`.
    fn nodes(&self, n: usize) -> Vec<f64> {
        linspace(self.min, self.max, n)
    }
}

fn default_ncomponents() -> usize {
    1
}

/// Grid topology of a store.
///
/// Both layouts assume rotational symmetry around the source, so horizontal
/// position is reduced to epicentral distance.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum Layout {
    /// Fixed receiver depth.
    ///
    /// Index variables are (source_depth, distance, component).
    TypeA {
        #[cfg_attr(feature = "serde", serde(default))]
        receiver_depth: f64,
        source_depth: AxisRange,
        distance: AxisRange,
    },

    /// Variable receiver depth.
    ///
    /// Index variables are (receiver_depth, source_depth, distance, component).
    TypeB {
        receiver_depth: AxisRange,
        source_depth: AxisRange,
        distance: AxisRange,
    },
}

impl Layout {
    /// Number of spatial axes.
    pub fn ndims(&self) -> usize {
        self.axis_names().len()
    }

    /// Names of the spatial axes in declared order.
    pub fn axis_names(&self) -> &'static [&'static str] {
        match self {
            Self::TypeA { .. } => &["source_depth", "distance"],
            Self::TypeB { .. } => &["receiver_depth", "source_depth", "distance"],
        }
    }

    /// Spatial axes in declared order.
    pub fn axes(&self) -> SmallVec<[AxisRange; 3]> {
        match *self {
            Self::TypeA {
                source_depth,
                distance,
                ..
            } => smallvec![source_depth, distance],
            Self::TypeB {
                receiver_depth,
                source_depth,
                distance,
            } => smallvec![receiver_depth, source_depth, distance],
        }
    }

    /// Position of the distance axis in a coordinate tuple.
    pub fn distance_axis(&self) -> usize {
        self.ndims() - 1
    }
}

/// Scalar configuration of a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridConfig {
    pub layout: Layout,

    /// Size of the trailing component axis
    #[cfg_attr(feature = "serde", serde(default = "default_ncomponents"))]
    pub ncomponents: usize,

    /// Sampling rate of the stored traces [Hz]
    #[cfg_attr(feature = "serde", serde(default))]
    pub sample_rate: Option<f64>,
}

impl GridConfig {
    pub fn new(layout: Layout, ncomponents: usize) -> Self {
        Self {
            layout,
            ncomponents,
            sample_rate: None,
        }
    }

    /// Two-axis grid with receivers at the surface.
    pub fn type_a(source_depth: AxisRange, distance: AxisRange, ncomponents: usize) -> Self {
        Self::new(
            Layout::TypeA {
                receiver_depth: 0.0,
                source_depth,
                distance,
            },
            ncomponents,
        )
    }

    /// Three-axis grid.
    pub fn type_b(
        receiver_depth: AxisRange,
        source_depth: AxisRange,
        distance: AxisRange,
        ncomponents: usize,
    ) -> Self {
        Self::new(
            Layout::TypeB {
                receiver_depth,
                source_depth,
                distance,
            },
            ncomponents,
        )
    }

    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }
}

/// A validated regular grid with all derived quantities and its lookup engine.
#[derive(Clone, Debug, PartialEq)]
pub struct GridDefinition {
    config: GridConfig,

    /// Spatial axes in declared order
    axes: SmallVec<[AxisRange; 3]>,

    /// Number of nodes on each spatial axis
    counts: SmallVec<[usize; 3]>,

    /// Node coordinates of each spatial axis
    coords: Vec<Vec<f64>>,

    /// Sampling interval [s]
    deltat: Option<f64>,

    engine: IndexEngine,
}

impl GridDefinition {
    /// Validate a configuration and derive everything lookups need.
    ///
    /// # Errors
    /// * If any delta is zero, or any bound or delta is not finite
    /// * If any axis resolves to fewer than one node
    /// * If there are no components, or the sample rate is not positive
    /// * If the record count overflows `usize`
    pub fn build(config: GridConfig) -> Result<Self, ConfigError> {
        Self::derive(config).inspect_err(|e| debug!(error = %e, "rejected grid configuration"))
    }

    fn derive(config: GridConfig) -> Result<Self, ConfigError> {
        let ng = config.ncomponents;
        if ng == 0 {
            return Err(ConfigError::NoComponents);
        }

        let deltat = match config.sample_rate {
            Some(rate) if rate.is_finite() && rate > 0.0 => Some(1.0 / rate),
            Some(rate) => return Err(ConfigError::InvalidSampleRate(rate)),
            None => None,
        };

        let axes = config.layout.axes();
        let counts = axes
            .iter()
            .zip(config.layout.axis_names())
            .map(|(axis, name)| axis.count(name))
            .collect::<Result<SmallVec<[usize; 3]>, _>>()?;

        let engine = match config.layout {
            Layout::TypeA {
                receiver_depth,
                source_depth: a,
                distance: b,
            } => {
                if !receiver_depth.is_finite() {
                    return Err(ConfigError::NonFinite {
                        axis: "receiver_depth".into(),
                    });
                }
                IndexEngine::type_a([a.min, b.min], [a.delta, b.delta], [counts[0], counts[1]], ng)?
            }
            Layout::TypeB {
                receiver_depth: a,
                source_depth: b,
                distance: c,
            } => IndexEngine::type_b(
                [a.min, b.min, c.min],
                [a.delta, b.delta, c.delta],
                [counts[0], counts[1], counts[2]],
                ng,
            )?,
        };

        let coords = axes
            .iter()
            .zip(counts.iter())
            .map(|(axis, &n)| axis.nodes(n))
            .collect();

        debug!(
            counts = ?counts.as_slice(),
            ncomponents = ng,
            nrecords = engine.nrecords(),
            "built grid definition"
        );

        Ok(Self {
            config,
            axes,
            counts,
            coords,
            deltat,
            engine,
        })
    }

    /// Build a new definition from an edited copy of this one's configuration.
    ///
    /// `self` is left untouched, so lookups in flight against it are unaffected,
    /// and nothing is produced unless the edited configuration is valid.
    pub fn update(&self, edit: impl FnOnce(&mut GridConfig)) -> Result<Self, ConfigError> {
        let mut config = self.config;
        edit(&mut config);
        Self::build(config)
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.config.layout
    }

    /// Number of spatial axes.
    pub fn ndims(&self) -> usize {
        self.axes.len()
    }

    /// Spatial axes in declared order.
    pub fn axes(&self) -> &[AxisRange] {
        &self.axes
    }

    /// Number of nodes on each spatial axis.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Node coordinates of each spatial axis.
    pub fn coords(&self) -> &[Vec<f64>] {
        &self.coords
    }

    pub fn ncomponents(&self) -> usize {
        self.config.ncomponents
    }

    /// The component axis.
    pub fn component_ids(&self) -> Range<usize> {
        0..self.config.ncomponents
    }

    /// Total number of records, `ncomponents * prod(counts)`.
    pub fn nrecords(&self) -> usize {
        self.engine.nrecords()
    }

    pub fn sample_rate(&self) -> Option<f64> {
        self.config.sample_rate
    }

    /// Sampling interval, the inverse of the sample rate.
    pub fn deltat(&self) -> Option<f64> {
        self.deltat
    }

    /// Fixed receiver depth, for layouts that have one.
    pub fn receiver_depth(&self) -> Option<f64> {
        match self.config.layout {
            Layout::TypeA { receiver_depth, .. } => Some(receiver_depth),
            Layout::TypeB { .. } => None,
        }
    }

    /// Number of receiver depths; 1 when the receiver depth is fixed.
    pub fn nreceiver_depths(&self) -> usize {
        match self.config.layout {
            Layout::TypeA { .. } => 1,
            Layout::TypeB { .. } => self.counts[0],
        }
    }

    pub fn nsource_depths(&self) -> usize {
        self.counts[self.ndims() - 2]
    }

    pub fn ndistances(&self) -> usize {
        self.counts[self.ndims() - 1]
    }

    /// Distance entry of a coordinate tuple given in declared axis order.
    pub fn distance(&self, coords: &[f64]) -> Option<f64> {
        coords.get(self.config.layout.distance_axis()).copied()
    }

    pub fn engine(&self) -> &IndexEngine {
        &self.engine
    }

    /// Record index of the node nearest to `coords`, see [`IndexEngine::exact`].
    pub fn irecord(&self, coords: &[f64], ig: usize) -> Result<usize, LookupError> {
        self.engine.exact(coords, ig)
    }

    /// Record indices for arrays of coordinates, see [`IndexEngine::batch`].
    pub fn irecords(&self, coords: &[&[f64]], igs: &[usize]) -> Result<Vec<usize>, LookupError> {
        self.engine.batch(coords, igs)
    }

    /// Interpolation records and weights, see [`IndexEngine::vicinity`].
    pub fn vicinity(&self, coords: &[f64], ig: usize) -> Result<Vicinity<f64>, LookupError> {
        self.engine.vicinity(coords, ig)
    }

    /// Spatial grid nodes over the leading `depth` axes (all when `None`),
    /// in C ordering.
    ///
    /// `depth` is clamped to `1..=ndims`.
    pub fn iter_nodes(&self, depth: Option<usize>) -> impl Iterator<Item = Vec<f64>> + '_ {
        let ndims = self.ndims();
        let depth = depth.unwrap_or(ndims).clamp(1, ndims);
        self.coords[..depth]
            .iter()
            .map(|axis| axis.iter().copied())
            .multi_cartesian_product()
    }
}
