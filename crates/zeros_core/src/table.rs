//! Precomputed zeros of J_n for integer orders.
//!
//! Each row of the table holds the first roots of one integer order, starting
//! at order 0, truncated (never rounded up) to the table's precision. Entries
//! are therefore lower bounds that sit less than `10^-precision` below the
//! true root.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::TableError;

/// Decimal places kept by the bundled table.
pub const TRUNCATION_PRECISION: u32 = 4;

// Orders 0..=100, first 100 roots each.
const BUNDLED_TABLE: &str = include_str!("../data/zeros.tsv");

#[derive(Debug, Clone, PartialEq)]
pub struct RootTable {
    rows: Vec<Vec<f64>>,
    precision: u32,
}

impl RootTable {
    pub fn new(rows: Vec<Vec<f64>>, precision: u32) -> Result<Self, TableError> {
        if rows.is_empty() {
            return Err(TableError::Empty);
        }
        if let Some(line) = rows.iter().position(Vec::is_empty) {
            return Err(TableError::EmptyRow { line: line + 1 });
        }
        Ok(Self { rows, precision })
    }

    /// Parses tab-separated rows, one row per order starting at 0.
    pub fn parse(text: &str, precision: u32) -> Result<Self, TableError> {
        let mut rows = Vec::new();
        for (idx, line) in text.trim_end().lines().enumerate() {
            if line.trim().is_empty() {
                return Err(TableError::EmptyRow { line: idx + 1 });
            }
            let row = line
                .split('\t')
                .enumerate()
                .map(|(col, field)| parse_entry(field, idx + 1, col + 1))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Self::new(rows, precision)
    }

    pub fn load(path: &Path, precision: u32) -> Result<Self, TableError> {
        let text = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, precision)
    }

    /// The table compiled into the crate.
    pub fn bundled() -> Result<Self, TableError> {
        Self::parse(BUNDLED_TABLE, TRUNCATION_PRECISION)
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Number of tabulated orders; orders `0..orders()` have a row.
    pub fn orders(&self) -> usize {
        self.rows.len()
    }

    pub fn roots_per_order(&self, order: u32) -> usize {
        self.rows.get(order as usize).map_or(0, Vec::len)
    }

    /// Truncated value of root `root_number` (1-based) of J_order, or `None`
    /// when either lies outside the table.
    pub fn lookup(&self, order: u32, root_number: usize) -> Option<f64> {
        let index = root_number.checked_sub(1)?;
        self.rows.get(order as usize)?.get(index).copied()
    }

    /// Renders the table in the layout [`parse`](Self::parse) reads.
    pub fn to_text(&self) -> String {
        let width = self.precision as usize + 4;
        let precision = self.precision as usize;
        let mut out = String::new();
        for row in &self.rows {
            let line = row
                .iter()
                .map(|value| format!("{value:>width$.precision$}"))
                .collect::<Vec<_>>()
                .join("\t");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn parse_entry(field: &str, line: usize, column: usize) -> Result<f64, TableError> {
    match field.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(TableError::Parse {
            line,
            column,
            value: field.to_string(),
        }),
    }
}

/// Where a [`LazyRootTable`] gets its contents from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableSource {
    #[default]
    Bundled,
    File {
        path: PathBuf,
        #[serde(default = "default_precision")]
        precision: u32,
    },
    Disabled,
    /// A table handed over already built; there is nothing to load.
    #[serde(skip)]
    Prebuilt,
}

fn default_precision() -> u32 {
    TRUNCATION_PRECISION
}

/// A root table that is read from its source on first use, exactly once.
///
/// A source that cannot be read leaves the table permanently absent; every
/// lookup then returns `None` and callers compute roots explicitly.
#[derive(Debug)]
pub struct LazyRootTable {
    source: TableSource,
    table: OnceLock<Option<RootTable>>,
}

impl LazyRootTable {
    pub fn new(source: TableSource) -> Self {
        Self {
            source,
            table: OnceLock::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(TableSource::Disabled)
    }

    /// Wraps an already built table, skipping the lazy load.
    pub fn from_table(table: RootTable) -> Self {
        Self {
            source: TableSource::Prebuilt,
            table: OnceLock::from(Some(table)),
        }
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }

    pub fn get(&self) -> Option<&RootTable> {
        self.table.get_or_init(|| self.load()).as_ref()
    }

    pub fn lookup(&self, order: u32, root_number: usize) -> Option<f64> {
        self.get()?.lookup(order, root_number)
    }

    fn load(&self) -> Option<RootTable> {
        let loaded = match &self.source {
            TableSource::Disabled | TableSource::Prebuilt => return None,
            TableSource::Bundled => RootTable::bundled(),
            TableSource::File { path, precision } => RootTable::load(path, *precision),
        };
        match loaded {
            Ok(table) => {
                info!(
                    orders = table.orders(),
                    precision = table.precision(),
                    "loaded root table"
                );
                Some(table)
            }
            Err(err) => {
                warn!(error = %err, "root table unavailable, roots will be computed explicitly");
                None
            }
        }
    }
}

impl Default for LazyRootTable {
    fn default() -> Self {
        Self::new(TableSource::Bundled)
    }
}
