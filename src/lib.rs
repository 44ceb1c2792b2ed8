//! Geometry and record indexing for regular grids of precomputed Green's functions.
//!
//! A store of Green's functions holds one record per node of a regular grid of
//! source/receiver configurations and per component. This crate describes that
//! grid and maps physical coordinates to flat record indices; it never touches
//! the records themselves.
//!
//! Two layouts are supported:
//!
//! | Layout  | Spatial axes (slowest first)                    | Receiver depth |
//! |---------|-------------------------------------------------|----------------|
//! | Type A  | source depth, distance                          | fixed          |
//! | Type B  | receiver depth, source depth, distance          | gridded        |
//!
//! A component axis always follows the spatial axes and varies fastest.
//!
//! # Lookups
//! * [`GridDefinition::irecord`] finds the record of the nearest node,
//!   provided the coordinates round onto the grid.
//! * [`GridDefinition::irecords`] does the same for many points at once and
//!   fails as a whole if any point is off the grid.
//! * [`GridDefinition::vicinity`] finds the records surrounding a point together
//!   with their multilinear weights, for interpolating between records.
//!
//! # Example
//! ```rust
//! use gfgrid::{AxisRange, GridConfig, GridDefinition};
//!
//! // Source depths 0, 5, 10 km; distances 100, 150, 200 km; two components
//! let config = GridConfig::type_a(
//!     AxisRange::new(0.0, 10e3, 5e3),
//!     AxisRange::new(100e3, 200e3, 50e3),
//!     2,
//! );
//! let grid = GridDefinition::build(config).unwrap();
//! assert_eq!(grid.nrecords(), 18);
//!
//! // Nearest node
//! assert_eq!(grid.irecord(&[5e3, 150e3], 1).unwrap(), 9);
//!
//! // Halfway between two source depths
//! let weights = grid.vicinity(&[2.5e3, 150e3], 1).unwrap();
//! assert_eq!(&weights[..], &[(3, 0.5), (9, 0.5)]);
//!
//! // Every other distance, all source depths
//! let extraction = grid.iter_extraction(Some(":,100k:200k:100k")).unwrap();
//! assert_eq!(extraction.len(), 3 * 2 * 2);
//! ```
//!
//! # Features
//! * `serde` (default): (de)serialization of [`GridConfig`] and its parts
//! * `parallel`: split large batch lookups across threads with rayon
// These "needless" range loops are a significant speedup
#![allow(clippy::needless_range_loop)]

pub mod error;
pub use error::{ConfigError, GridSpecError, LookupError};

pub mod grid;
pub use grid::{AxisRange, GridConfig, GridDefinition, Layout};

pub mod index;
pub use index::{IndexEngine, RegularIndex, Vicinity};

pub mod gridspec;
pub use gridspec::{parse_grid_spec, AxisSpec, ResolvedAxis};

pub mod extract;
pub use extract::{Extraction, ExtractionNode};

pub mod store;
pub use store::GridStore;

pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
