use std::fmt;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;
use zeros_core::builder::build_table;
use zeros_core::{BesselRoots, RootsConfig, TableSource};

use crate::Command;

/// Result of one command, printable as text or JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Zero {
        order: f64,
        number: usize,
        resolution: u32,
        zero: f64,
    },
    ZeroAfter {
        order: f64,
        start: f64,
        resolution: u32,
        zero: f64,
    },
    Zeros {
        order: f64,
        resolution: u32,
        zeros: Vec<f64>,
    },
    Orders {
        root: f64,
        resolution: u32,
        orders: Vec<f64>,
    },
    Extremum {
        order: f64,
        resolution: u32,
        extremum: f64,
    },
    Value {
        order: f64,
        argument: f64,
        value: f64,
    },
    Table {
        path: String,
        orders: usize,
        count: usize,
        precision: u32,
    },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Zero { zero, .. } | Report::ZeroAfter { zero, .. } => write!(f, "{zero}"),
            Report::Zeros { zeros, .. } => write!(f, "{}", join(zeros)),
            Report::Orders { orders, .. } => write!(f, "{}", join(orders)),
            Report::Extremum { extremum, .. } => write!(f, "{extremum}"),
            Report::Value { value, .. } => write!(f, "{value}"),
            Report::Table {
                path,
                orders,
                count,
                ..
            } => write!(f, "wrote {orders} orders x {count} zeros to {path}"),
        }
    }
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join("\t")
}

pub fn run(command: Command, config: RootsConfig) -> Result<Report> {
    match command {
        Command::Zero {
            order,
            number,
            resolution,
        } => {
            let roots = BesselRoots::from_config(config);
            let zero = roots
                .find_zero(order, number, resolution)
                .with_context(|| format!("Failed to find zero {number} of J_{order}"))?;
            Ok(Report::Zero {
                order,
                number,
                resolution,
                zero,
            })
        }
        Command::ZeroAfter {
            order,
            start,
            resolution,
        } => {
            let roots = BesselRoots::from_config(config);
            let zero = roots
                .find_zero_after(order, start, resolution)
                .with_context(|| format!("Failed to find a zero of J_{order} after {start}"))?;
            Ok(Report::ZeroAfter {
                order,
                start,
                resolution,
                zero,
            })
        }
        Command::Zeros {
            order,
            count,
            resolution,
        } => {
            let roots = BesselRoots::from_config(config);
            let zeros = roots
                .zeros(order, count, resolution)
                .with_context(|| format!("Failed to list zeros of J_{order}"))?;
            Ok(Report::Zeros {
                order,
                resolution,
                zeros,
            })
        }
        Command::Indices { root, resolution } => {
            let roots = BesselRoots::from_config(config);
            let orders = roots
                .find_indices(root, resolution)
                .with_context(|| format!("Failed to find orders with a zero at {root}"))?;
            Ok(Report::Orders {
                root,
                resolution,
                orders,
            })
        }
        Command::Extremum {
            order,
            start,
            resolution,
        } => {
            let roots = BesselRoots::from_config(config);
            let extremum = roots
                .find_extremum_after(order, start, resolution)
                .with_context(|| format!("Failed to find an extremum of J_{order} after {start}"))?;
            Ok(Report::Extremum {
                order,
                resolution,
                extremum,
            })
        }
        Command::Eval {
            order,
            argument,
            digits,
        } => {
            let roots = BesselRoots::from_config(config);
            let value = match digits {
                Some(digits) => roots.evaluate_rounded(order, argument, digits),
                None => roots.evaluate(order, argument),
            };
            if value.is_nan() {
                bail!("J_{order}({argument}) is not a real number");
            }
            Ok(Report::Value {
                order,
                argument,
                value,
            })
        }
        Command::BuildTable {
            orders,
            count,
            precision,
            output,
        } => {
            if orders == 0 || count == 0 {
                bail!("orders and count must be positive.");
            }
            // Never seed the build from a table, least of all the one being replaced.
            let roots = BesselRoots::from_config(RootsConfig {
                table: TableSource::Disabled,
                ..config
            });
            let table = build_table(&roots, orders, count, precision)
                .context("Failed to build root table")?;
            std::fs::write(&output, table.to_text())
                .with_context(|| format!("Failed to write root table {}", output.display()))?;
            info!(path = %output.display(), orders, count, "root table written");
            Ok(Report::Table {
                path: output.display().to_string(),
                orders: table.orders(),
                count,
                precision,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run, Report};
    use crate::Command;
    use zeros_core::{RootTable, RootsConfig, TableSource};

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err:#}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn zero_command_reports_the_zero() {
        let report = run(
            Command::Zero {
                order: 0.0,
                number: 2,
                resolution: 4,
            },
            RootsConfig::default(),
        )
        .expect("command should succeed");
        assert_eq!(report.to_string(), "5.5201");
    }

    #[test]
    fn zero_after_command_reports_its_start() {
        let report = run(
            Command::ZeroAfter {
                order: 1.0,
                start: 4.0,
                resolution: 4,
            },
            RootsConfig::default(),
        )
        .expect("command should succeed");
        assert_eq!(
            report,
            Report::ZeroAfter {
                order: 1.0,
                start: 4.0,
                resolution: 4,
                zero: 7.0156,
            }
        );
        let json = serde_json::to_value(&report).expect("report should serialize");
        assert_eq!(json["kind"], "zero_after");
        assert_eq!(json["start"], 4.0);
        assert!(json.get("number").is_none());
    }

    #[test]
    fn indices_command_reports_orders() {
        let report = run(
            Command::Indices {
                root: 5.5201,
                resolution: 4,
            },
            RootsConfig::default(),
        )
        .expect("command should succeed");
        assert_eq!(
            report,
            Report::Orders {
                root: 5.5201,
                resolution: 4,
                orders: vec![0.0, 2.305],
            }
        );
        let json = serde_json::to_value(&report).expect("report should serialize");
        assert_eq!(json["kind"], "orders");
        assert_eq!(json["orders"][1], 2.305);
    }

    #[test]
    fn illegal_root_is_reported() {
        assert_err_contains(
            run(
                Command::Indices {
                    root: 1.0,
                    resolution: 4,
                },
                RootsConfig::default(),
            ),
            "cannot be smaller than the first zero of J_0",
        );
    }

    #[test]
    fn eval_rejects_non_real_values() {
        assert_err_contains(
            run(
                Command::Eval {
                    order: 0.5,
                    argument: -1.0,
                    digits: None,
                },
                RootsConfig::default(),
            ),
            "not a real number",
        );
    }

    #[test]
    fn build_table_writes_a_readable_table() {
        let path = std::env::temp_dir().join(format!("zeros-cli-{}.tsv", std::process::id()));
        let report = run(
            Command::BuildTable {
                orders: 3,
                count: 4,
                precision: 4,
                output: path.clone(),
            },
            RootsConfig {
                table: TableSource::File {
                    path: path.clone(),
                    precision: 4,
                },
                ..RootsConfig::default()
            },
        )
        .expect("table should build");
        assert!(matches!(report, Report::Table { orders: 3, .. }));

        let table = RootTable::load(&path, 4).expect("written table should load");
        let bundled = RootTable::bundled().expect("bundled table should parse");
        assert_eq!(table.lookup(2, 4), bundled.lookup(2, 4));
        std::fs::remove_file(&path).expect("temp file should be removable");
    }
}
