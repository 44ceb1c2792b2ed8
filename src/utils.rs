//! Convenience methods for constructing node sequences in a way that echoes,
//! but does not exactly match, methods common in scripting languages.
use itertools::Itertools;

/// Generates `n` evenly spaced values from start to stop,
/// including the endpoint.
///
/// A single point yields `[start]`, and `n == 0` yields nothing.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let dx = (stop - start) / (n - 1) as f64;
            // Pin the last entry so the endpoint is exact
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + i as f64 * dx })
                .collect()
        }
    }
}

/// Generates a meshgrid in C ordering (x0, y0, z0, x0, y0, z1, ..., x0, yn, zn)
pub fn meshgrid(x: Vec<&Vec<f64>>) -> Vec<Vec<f64>> {
    x.into_iter()
        .multi_cartesian_product()
        .map(|xx| xx.iter().map(|y| **y).collect())
        .collect()
}
