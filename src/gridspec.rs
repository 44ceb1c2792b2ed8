//! Textual sub-grid requests for bulk extraction.
//!
//! A grid specification holds one comma-separated entry per spatial axis,
//! each of the form `RANGE[@COUNT]`, where `RANGE` is `A`, `A:B` or
//! `A:B:STEP`. Any of `A`, `B` and `STEP` may be left empty to fall back to
//! the grid's own bounds and spacing, and may carry a unit suffix
//! (`k` = 1e3, `M` = 1e6).
//!
//! ```text
//! 10k:20k:500      start 10000, stop 20000, step 500
//! :100@5           from the axis minimum to 100 in five points
//! 50               a single node at 50
//! ,:300            full first axis, second axis up to 300
//! ```
//!
//! Parsing ([`parse_grid_spec`]) is independent of any grid; the parsed
//! [`AxisSpec`]s are resolved against an axis' bounds with [`AxisSpec::resolve`].
use std::fmt;
use std::str::FromStr;

use num_traits::NumCast;
use tracing::trace;

use crate::error::GridSpecError;
use crate::grid::AxisRange;
use crate::utils::linspace;

/// Tolerance on snapping a requested stop to the last generated node.
pub const STOP_EPS: f64 = 1e-5;

/// Requested range along one axis, before resolution against the grid.
///
/// At most one of `step` and `count` is set by the parser.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisSpec {
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub step: Option<f64>,
    pub count: Option<usize>,
}

/// Concrete evenly spaced range along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedAxis {
    pub start: f64,
    pub stop: f64,
    pub count: usize,
}

impl ResolvedAxis {
    /// Value `i` of the sequence, as generated by [`values`](Self::values).
    pub fn value(&self, i: usize) -> f64 {
        match self.count {
            0 | 1 => self.start,
            n if i == n - 1 => self.stop,
            n => self.start + i as f64 * ((self.stop - self.start) / (n - 1) as f64),
        }
    }

    /// The `count` evenly spaced values from `start` to `stop`.
    pub fn values(&self) -> Vec<f64> {
        linspace(self.start, self.stop, self.count)
    }
}

/// Parse a number with an optional unit suffix; empty means unset.
fn float_or_none(s: &str) -> Result<Option<f64>, &'static str> {
    let s = s.trim();
    let (s, factor) = match s.chars().last() {
        Some('k') => (&s[..s.len() - 1], Some(1e3)),
        Some('M') => (&s[..s.len() - 1], Some(1e6)),
        _ => (s, None),
    };
    if s.is_empty() {
        return match factor {
            Some(_) => Err("unit without a number"),
            None => Ok(None),
        };
    }

    let v = s.trim().parse::<f64>().map_err(|_| "malformed number")?;
    if !v.is_finite() {
        return Err("non-finite number");
    }
    Ok(Some(v * factor.unwrap_or(1.0)))
}

impl AxisSpec {
    /// Parse the specification of a single axis.
    fn parse(dspec: &str) -> Result<Self, &'static str> {
        let mut spec = Self::default();

        let (range, count) = match dspec.split_once('@') {
            Some((range, count)) => (range, Some(count)),
            None => (dspec, None),
        };
        if let Some(count) = count {
            if count.contains('@') {
                return Err("more than one count");
            }
            let n: i64 = count.trim().parse().map_err(|_| "malformed count")?;
            if n <= 0 {
                return Err("count must be positive");
            }
            spec.count = <usize as NumCast>::from(n);
        }

        let v = range
            .split(':')
            .map(float_or_none)
            .collect::<Result<Vec<_>, _>>()?;
        match v[..] {
            [a] => {
                spec.start = a;
                spec.stop = a;
            }
            [a, b] => {
                spec.start = a;
                spec.stop = b;
            }
            [a, b, step] => {
                if spec.count.is_some() {
                    return Err("both step and count given");
                }
                if step == Some(0.0) {
                    return Err("zero step");
                }
                spec.start = a;
                spec.stop = b;
                spec.step = step;
            }
            _ => return Err("too many values"),
        }

        Ok(spec)
    }

    /// Resolve against the bounds `(min, max)` and spacing `delta` of a grid axis.
    ///
    /// * Missing `start`/`stop` default to the axis bounds, swapped for a negative step.
    /// * A missing step defaults to the axis spacing, pointing from `min` to `max`.
    /// * Without a count, the count is derived from the step. If the resulting
    ///   last node misses `stop` by more than [`STOP_EPS`], the count is rounded
    ///   down instead and `stop` moved to the last node, so no node lies beyond
    ///   the requested stop.
    /// * If `start == stop`, the count is forced to 1.
    ///
    /// # Errors
    /// * If the step points away from `stop` and no count was given
    pub fn resolve(&self, axis: &AxisRange) -> Result<ResolvedAxis, GridSpecError> {
        let (mi, ma) = (axis.min, axis.max);
        let swap = matches!(self.step, Some(step) if step < 0.0);

        let start = self.start.unwrap_or(if swap { ma } else { mi });
        let mut stop = self.stop.unwrap_or(if swap { mi } else { ma });
        let step = self.step.unwrap_or(if ma < mi {
            -axis.delta.abs()
        } else {
            axis.delta.abs()
        });

        let count = match self.count {
            Some(count) => count,
            None => {
                if stop != start && (step < 0.0) != (stop - start < 0.0) {
                    return Err(GridSpecError::new(self.to_string(), "step points away from stop"));
                }

                let span = (stop - start) / step;
                let mut n = span.round();
                let stop2 = start + n * step;
                if (stop - stop2).abs() > STOP_EPS {
                    n = span.floor();
                    stop = start + n * step;
                } else {
                    stop = stop2;
                }
                <usize as NumCast>::from(n + 1.0)
                    .ok_or_else(|| GridSpecError::new(self.to_string(), "too many nodes"))?
            }
        };

        let count = if start == stop { 1 } else { count };

        let resolved = ResolvedAxis { start, stop, count };
        trace!(spec = %self, ?resolved, "resolved axis range");
        Ok(resolved)
    }
}

impl FromStr for AxisSpec {
    type Err = GridSpecError;

    /// Parse the specification of a single axis, e.g. `0:100:25` or `1k:2k@5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(|reason| GridSpecError::new(s, reason))
    }
}

impl fmt::Display for AxisSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_opt(f: &mut fmt::Formatter<'_>, v: Option<f64>) -> fmt::Result {
            match v {
                Some(v) => write!(f, "{v}"),
                None => Ok(()),
            }
        }

        write_opt(f, self.start)?;
        if self.stop != self.start || self.step.is_some() {
            f.write_str(":")?;
            write_opt(f, self.stop)?;
        }
        if self.step.is_some() {
            f.write_str(":")?;
            write_opt(f, self.step)?;
        }
        if let Some(count) = self.count {
            write!(f, "@{count}")?;
        }
        Ok(())
    }
}

/// Parse a comma-separated grid specification into one [`AxisSpec`] per axis.
///
/// # Errors
/// * If any number, unit or count is malformed
/// * If an axis has more than three range values, or both a step and a count
/// * If a step is exactly zero, or a count is not positive
///
/// The error carries the full specification text.
pub fn parse_grid_spec(spec: &str) -> Result<Vec<AxisSpec>, GridSpecError> {
    let axes = spec
        .split(',')
        .map(AxisSpec::parse)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| GridSpecError::new(spec, reason))?;
    trace!(spec, naxes = axes.len(), "parsed grid specification");
    Ok(axes)
}
