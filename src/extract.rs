//! Node enumeration for bulk extraction and export.
//!
//! An [`Extraction`] fixes one evenly spaced range per spatial axis, either
//! the grid's own nodes or a sub-range requested with an [`AxisSpec`], plus the
//! full component axis. Iterating it yields the cross product in C ordering,
//! component fastest, which for an unrestricted extraction is exactly the
//! storage order of the records.
use itertools::Itertools;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::GridSpecError;
use crate::grid::GridDefinition;
use crate::gridspec::{parse_grid_spec, AxisSpec, ResolvedAxis};

/// One entry of an extraction: a coordinate per spatial axis and a component id.
///
/// Not yet flattened to a record index; use the grid's lookups for that.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionNode {
    pub coords: SmallVec<[f64; 3]>,
    pub component: usize,
}

/// A finite, re-iterable set of extraction nodes.
///
/// Node values are generated while iterating, so requests with very long
/// axes cost nothing until they are consumed.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    /// Range to visit along each spatial axis
    axes: SmallVec<[ResolvedAxis; 3]>,

    /// Size of the component axis
    ncomponents: usize,

    /// Total number of nodes
    len: usize,
}

impl Extraction {
    /// Resolve per-axis requests against a grid. Axes past the end of `specs`
    /// are taken whole.
    ///
    /// # Errors
    /// * If there are more requests than spatial axes
    /// * If any request cannot be resolved against its axis
    /// * If the total number of nodes overflows `usize`
    pub fn new(grid: &GridDefinition, specs: &[AxisSpec]) -> Result<Self, GridSpecError> {
        if specs.len() > grid.ndims() {
            return Err(GridSpecError::new(
                specs.iter().join(","),
                "more axes than the grid has",
            ));
        }

        let axes = grid
            .axes()
            .iter()
            .zip(grid.counts())
            .enumerate()
            .map(|(i, (axis, &count))| match specs.get(i) {
                Some(spec) => spec.resolve(axis),
                None => Ok(ResolvedAxis {
                    start: axis.min,
                    stop: axis.max,
                    count,
                }),
            })
            .collect::<Result<SmallVec<[ResolvedAxis; 3]>, _>>()?;

        let len = axes
            .iter()
            .try_fold(grid.ncomponents(), |n, axis| n.checked_mul(axis.count))
            .ok_or_else(|| GridSpecError::new(specs.iter().join(","), "too many nodes"))?;

        let extraction = Self {
            axes,
            ncomponents: grid.ncomponents(),
            len,
        };
        let shape = extraction.shape();
        debug!(shape = ?shape.as_slice(), "prepared extraction");
        Ok(extraction)
    }

    /// Range visited along each spatial axis.
    pub fn axes(&self) -> &[ResolvedAxis] {
        &self.axes
    }

    pub fn ncomponents(&self) -> usize {
        self.ncomponents
    }

    /// Length of each spatial axis, followed by the number of components.
    pub fn shape(&self) -> SmallVec<[usize; 4]> {
        self.axes
            .iter()
            .map(|axis| axis.count)
            .chain(std::iter::once(self.ncomponents))
            .collect()
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Visit every node, spatial axes in declared order (first slowest),
    /// then the component axis. Each call starts over from the first node.
    pub fn iter(&self) -> impl Iterator<Item = ExtractionNode> + '_ {
        let ncomponents = self.ncomponents;
        self.axes
            .iter()
            .map(|axis| (0..axis.count).map(move |i| axis.value(i)))
            .multi_cartesian_product()
            .flat_map(move |coords| {
                (0..ncomponents).map(move |component| ExtractionNode {
                    coords: SmallVec::from_slice(&coords),
                    component,
                })
            })
    }
}

impl GridDefinition {
    /// Extraction over a sub-grid given as parsed per-axis requests,
    /// see [`Extraction::new`].
    pub fn extraction(&self, specs: &[AxisSpec]) -> Result<Extraction, GridSpecError> {
        Extraction::new(self, specs)
    }

    /// Extraction over a sub-grid given in grid specification syntax,
    /// or over the whole grid when `spec` is `None`.
    ///
    /// Errors carry the full specification text.
    pub fn iter_extraction(&self, spec: Option<&str>) -> Result<Extraction, GridSpecError> {
        match spec {
            Some(spec) => {
                let specs = parse_grid_spec(spec)?;
                self.extraction(&specs)
                    .map_err(|e| GridSpecError::new(spec, e.reason))
            }
            None => self.extraction(&[]),
        }
    }
}
