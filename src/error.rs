//! Error types for grid construction, grid-spec parsing and record lookup.
//!
//! The three kinds never mix: configuration problems are reported while a
//! [`GridDefinition`](crate::GridDefinition) is built, grid-spec problems while
//! an extraction request is parsed or resolved, and lookup problems while a
//! coordinate is converted to a record index.
use thiserror::Error;

/// Invalid grid construction or update input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Step size of an axis is zero.
    #[error("axis `{axis}` has zero delta")]
    ZeroDelta { axis: String },

    /// Bound or step size of an axis is NaN or infinite.
    #[error("axis `{axis}` has a non-finite bound or delta")]
    NonFinite { axis: String },

    /// The bounds and step size of an axis do not describe at least one node,
    /// which happens when the sign of the delta disagrees with `max - min`.
    #[error("axis `{axis}` resolves to {count} nodes, need at least 1")]
    EmptyAxis { axis: String, count: i64 },

    /// The component axis must have at least one entry.
    #[error("number of components must be at least 1")]
    NoComponents,

    /// The record count does not fit in `usize`.
    #[error("grid has too many records to index")]
    TooManyRecords,

    /// Sample rate is zero, negative or not finite.
    #[error("invalid sample rate {0}")]
    InvalidSampleRate(f64),
}

/// Malformed textual range request, or a request that cannot be resolved
/// against the bounds of the grid axis it applies to.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid grid specification: {spec} ({reason})")]
pub struct GridSpecError {
    /// The offending input text.
    pub spec: String,
    /// Short description of what is wrong with it.
    pub reason: &'static str,
}

impl GridSpecError {
    pub(crate) fn new(spec: impl Into<String>, reason: &'static str) -> Self {
        Self {
            spec: spec.into(),
            reason,
        }
    }
}

/// Failure to convert coordinates into a record index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    /// A coordinate or component id lies outside the declared grid.
    ///
    /// For batch lookups, `element` is the position of the first offending
    /// entry in the input arrays.
    #[error("out of bounds{}", batch_element(.element))]
    OutOfBounds { element: Option<usize> },

    /// The number of coordinates does not match the grid's axis count,
    /// or batch input arrays differ in length.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

fn batch_element(element: &Option<usize>) -> String {
    match element {
        Some(i) => format!(" (batch element {i})"),
        None => String::new(),
    }
}

impl LookupError {
    pub(crate) const OUT_OF_BOUNDS: Self = Self::OutOfBounds { element: None };

    /// Whether this is the out-of-bounds kind, regardless of diagnostics.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }
}
