//! Root and order searches for J_ν built on the crossing search and the root table.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bessel::{BesselFunction, BesselJ};
use crate::crossing::{resolution_unit, round_to, CrossingFinder, SearchSettings};
use crate::error::{RootError, RootResult};
use crate::table::{LazyRootTable, TableSource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootsConfig {
    pub table: TableSource,
    pub search: SearchSettings,
}

/// Zeros of J_ν in the argument for fixed order, and orders for a fixed zero.
///
/// Roots are numbered from 1; the trivial zero at the origin is never counted.
#[derive(Debug)]
pub struct BesselRoots<P = BesselJ> {
    provider: P,
    table: LazyRootTable,
    finder: CrossingFinder,
}

impl BesselRoots<BesselJ> {
    pub fn new() -> Self {
        Self::from_config(RootsConfig::default())
    }

    pub fn from_config(config: RootsConfig) -> Self {
        Self::with_provider(BesselJ, LazyRootTable::new(config.table), config.search)
    }
}

impl Default for BesselRoots<BesselJ> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: BesselFunction> BesselRoots<P> {
    pub fn with_provider(provider: P, table: LazyRootTable, search: SearchSettings) -> Self {
        Self {
            provider,
            table,
            finder: CrossingFinder::new(search),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn table(&self) -> &LazyRootTable {
        &self.table
    }

    pub fn finder(&self) -> &CrossingFinder {
        &self.finder
    }

    pub fn evaluate(&self, order: f64, argument: f64) -> f64 {
        self.provider.evaluate(order, argument)
    }

    /// J_order(argument) rounded to `digits` decimal places.
    pub fn evaluate_rounded(&self, order: f64, argument: f64, digits: u32) -> f64 {
        round_to(self.evaluate(order, argument), digits)
    }

    /// Smallest zero of J_order greater than `start`. Starts below `order`
    /// are raised to `order`, since J_ν has no zeros in (0, ν).
    pub fn find_zero_after(&self, order: f64, start: f64, resolution: u32) -> RootResult<f64> {
        check_order(order)?;
        check_finite("start", start)?;
        self.refine_zero(order, start.max(order), resolution, 0)
    }

    /// Zero number `root_number` (1-based) of J_order.
    ///
    /// Integral orders are served from the root table when it has the entry:
    /// directly when `resolution` is below the table precision, otherwise by
    /// refining only the digits past the table precision. A non-integral
    /// order is searched for starting at the table zero of its integral part,
    /// which lies below the wanted zero and above the previous one.
    pub fn find_zero(&self, order: f64, root_number: usize, resolution: u32) -> RootResult<f64> {
        check_order(order)?;
        check_root_number(root_number)?;

        let Some((seed, precision)) = self.table_seed(order.floor(), root_number) else {
            debug!(order, root_number, "no table entry, computing zero explicitly");
            return self.compute_zero_explicit(order, root_number, resolution);
        };

        if order.fract() != 0.0 {
            debug!(order, root_number, seed, "seeding from integral order");
            return self.find_zero_after(order, seed, resolution);
        }
        if resolution < precision {
            debug!(order, root_number, seed, "zero served from table");
            return Ok(round_to(seed, resolution));
        }
        debug!(order, root_number, seed, "refining table zero");
        self.refine_zero(order, seed, resolution, precision)
    }

    /// Walks the zeros of J_order from the origin up to `root_number`.
    pub fn compute_zero_explicit(
        &self,
        order: f64,
        root_number: usize,
        resolution: u32,
    ) -> RootResult<f64> {
        check_order(order)?;
        check_root_number(root_number)?;
        let unit = resolution_unit(resolution);
        let mut previous = 0.0;
        for _ in 0..root_number {
            // Step one unit past the previous zero so it is not found again.
            previous = self.find_zero_after(order, previous + unit, resolution)?;
        }
        Ok(previous)
    }

    /// The first `count` zeros of J_order, in increasing order.
    pub fn zeros(&self, order: f64, count: usize, resolution: u32) -> RootResult<Vec<f64>> {
        check_order(order)?;
        let unit = resolution_unit(resolution);
        let mut zeros = Vec::with_capacity(count);
        let mut previous = 0.0;
        for _ in 0..count {
            previous = self.find_zero_after(order, previous + unit, resolution)?;
            zeros.push(previous);
        }
        Ok(zeros)
    }

    /// First extremum of J_order past `start`, located as a zero of J'_order.
    pub fn find_extremum_after(&self, order: f64, start: f64, resolution: u32) -> RootResult<f64> {
        check_order(order)?;
        check_finite("start", start)?;
        let slope = |x: f64| self.provider.derivative(order, x);
        self.finder
            .find_crossing(&slope, start.max(order), resolution, 0)
    }

    /// Smallest order greater than `start` for which `root` is a zero of J_order.
    ///
    /// Every such order lies below `root`, so the search stops there.
    pub fn find_index_after(&self, root: f64, start: f64, resolution: u32) -> RootResult<f64> {
        check_finite("root", root)?;
        check_finite("start", start)?;
        let in_order = |nu: f64| self.provider.evaluate(nu, root);
        self.finder
            .find_crossing_below(&in_order, start.max(0.0), resolution, 0, root)
    }

    /// All orders ν ≥ 0, ascending, for which `root` is a zero of J_ν.
    ///
    /// There is one positive order for every zero of J_0 below `root`, plus
    /// order 0 itself when `root` is a zero of J_0 at this resolution.
    pub fn find_indices(&self, root: f64, resolution: u32) -> RootResult<Vec<f64>> {
        check_finite("root", root)?;
        let unit = resolution_unit(resolution);
        let target = round_to(root, resolution);

        let first_zero = self.find_zero_after(0.0, 0.0, resolution)?;
        if target < first_zero {
            return Err(RootError::IllegalRoot {
                value: root,
                first_zero,
            });
        }

        let mut count = 0usize;
        let mut includes_zero = false;
        let mut zero = first_zero;
        loop {
            if target == zero {
                includes_zero = true;
                break;
            }
            if target < zero {
                break;
            }
            count += 1;
            zero = self.find_zero_after(0.0, zero + unit, resolution)?;
        }

        let mut orders = Vec::with_capacity(count + usize::from(includes_zero));
        let mut start = 0.0;
        if includes_zero {
            orders.push(0.0);
            // Skip orders within one unit of 0, they are order 0 at this resolution.
            start = unit;
        }
        for _ in 0..count {
            let order = self.find_index_after(root, start, resolution)?;
            orders.push(order);
            start = order + unit;
        }
        debug!(root, resolution, ?orders, "orders found");
        Ok(orders)
    }

    fn refine_zero(
        &self,
        order: f64,
        start: f64,
        resolution: u32,
        starting_power: u32,
    ) -> RootResult<f64> {
        let in_argument = |x: f64| self.provider.evaluate(order, x);
        self.finder
            .find_crossing(&in_argument, start, resolution, starting_power)
    }

    fn table_seed(&self, order: f64, root_number: usize) -> Option<(f64, u32)> {
        if order > f64::from(u32::MAX) {
            return None;
        }
        let table = self.table.get()?;
        let seed = table.lookup(order as u32, root_number)?;
        Some((seed, table.precision()))
    }
}

fn check_order(order: f64) -> RootResult<()> {
    if order.is_finite() && order >= 0.0 {
        Ok(())
    } else {
        Err(RootError::InvalidOrder(order))
    }
}

fn check_root_number(root_number: usize) -> RootResult<()> {
    if root_number == 0 {
        Err(RootError::InvalidRootNumber)
    } else {
        Ok(())
    }
}

fn check_finite(name: &'static str, value: f64) -> RootResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RootError::InvalidArgument { name, value })
    }
}
