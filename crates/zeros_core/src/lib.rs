//! The `zeros_core` crate locates zeros of the Bessel function of the first kind J_ν.
//! It answers two questions: for a fixed order, where are the successive zeros in the
//! argument; and for a fixed zero, which orders vanish there.
//!
//! Key components:
//! - **Bessel**: `BesselFunction` (provider seam) and the built-in real-order `BesselJ`.
//! - **Crossing**: `CrossingFinder`, an adaptive step-refinement search for sign changes.
//! - **Table**: `RootTable` of truncated precomputed zeros, loaded once by `LazyRootTable`.
//! - **Service**: `BesselRoots`, the zero/order searches on top of the above.
//! - **Builder**: offline generation of the root table.

pub mod bessel;
pub mod builder;
pub mod crossing;
pub mod error;
pub mod service;
pub mod table;

pub use bessel::{BesselFunction, BesselJ};
pub use crossing::{CrossingFinder, OscillatingFunction, SearchSettings};
pub use error::{RootError, RootResult, TableError};
pub use service::{BesselRoots, RootsConfig};
pub use table::{LazyRootTable, RootTable, TableSource, TRUNCATION_PRECISION};
