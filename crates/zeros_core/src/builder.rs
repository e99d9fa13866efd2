//! Offline generation of the root table.

use tracing::info;

use crate::bessel::BesselFunction;
use crate::crossing::{resolution_unit, truncate_to};
use crate::error::TableError;
use crate::service::BesselRoots;
use crate::table::RootTable;

/// Extra digits searched beyond the table precision before truncating.
const GUARD_DIGITS: u32 = 4;

/// Computes the first `count` zeros of J_n for every order in `0..orders`,
/// truncated to `precision` decimal places.
///
/// Each entry is truncated from the lower end of the crossing bracket rather
/// than from a rounded root, so no entry can exceed the zero it stands for.
/// The service's own table is never consulted.
pub fn build_table<P: BesselFunction>(
    roots: &BesselRoots<P>,
    orders: u32,
    count: usize,
    precision: u32,
) -> Result<RootTable, TableError> {
    let resolution = precision + GUARD_DIGITS;
    let unit = resolution_unit(resolution);
    let mut rows = Vec::with_capacity(orders as usize);
    for order in 0..orders {
        let order = f64::from(order);
        let in_argument = |x: f64| roots.provider().evaluate(order, x);
        let mut row = Vec::with_capacity(count);
        let mut lower = 0.0f64;
        for _ in 0..count {
            let start = if row.is_empty() { order } else { lower + unit };
            lower = roots
                .finder()
                .bracket_crossing(&in_argument, start, resolution, 0, None)?;
            row.push(truncate_to(lower, precision));
        }
        info!(order, count, "tabulated zeros");
        rows.push(row);
    }
    RootTable::new(rows, precision)
}

#[cfg(test)]
mod tests {
    use super::build_table;
    use crate::service::{BesselRoots, RootsConfig};
    use crate::table::{RootTable, TableSource};

    #[test]
    fn rebuilds_the_start_of_the_bundled_table() {
        let roots = BesselRoots::from_config(RootsConfig {
            table: TableSource::Disabled,
            ..RootsConfig::default()
        });
        let built = build_table(&roots, 4, 6, 4).expect("table should build");
        let bundled = RootTable::bundled().expect("bundled table should parse");
        assert_eq!(built.orders(), 4);
        for order in 0..4 {
            assert_eq!(built.roots_per_order(order), 6);
            for n in 1..=6 {
                assert_eq!(built.lookup(order, n), bundled.lookup(order, n));
            }
        }
    }

    #[test]
    fn built_entries_never_exceed_their_zero() {
        let roots = BesselRoots::new();
        let built = build_table(&roots, 3, 5, 3).expect("table should build");
        for order in 0..3u32 {
            for n in 1..=5 {
                let entry = built.lookup(order, n).expect("entry in range");
                let zero = roots.compute_zero_explicit(f64::from(order), n, 8).unwrap();
                assert!(entry <= zero);
                assert!(zero - entry < 1e-3 + 1e-8);
            }
        }
    }
}
