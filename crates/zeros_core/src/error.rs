use std::path::PathBuf;

use thiserror::Error;

/// Failures of the root and order searches.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RootError {
    /// No order ν ≥ 0 has a root this small.
    #[error("the specified zero {value} cannot be smaller than the first zero of J_0 ({first_zero})")]
    IllegalRoot { value: f64, first_zero: f64 },
    #[error("no crossing found after {start} ({reason})")]
    NoCrossing { start: f64, reason: String },
    #[error("function value is not finite at {at}")]
    NonFinite { at: f64 },
    #[error("order must be finite and non-negative, got {0}")]
    InvalidOrder(f64),
    #[error("root numbers start at 1")]
    InvalidRootNumber,
    #[error("{name} must be finite, got {value}")]
    InvalidArgument { name: &'static str, value: f64 },
    #[error("resolution {requested} exceeds the maximum of {max} digits")]
    InvalidResolution { requested: u32, max: u32 },
}

pub type RootResult<T> = Result<T, RootError>;

/// Failures while loading or parsing a root table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read root table {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid root table entry {value:?} at line {line}, column {column}")]
    Parse {
        line: usize,
        column: usize,
        value: String,
    },
    #[error("root table row {line} is empty")]
    EmptyRow { line: usize },
    #[error("root table has no rows")]
    Empty,
    #[error(transparent)]
    Search(#[from] RootError),
}
