//! Command line front-end for `zeros_core`.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use zeros_core::{RootsConfig, TableSource, TRUNCATION_PRECISION};

use crate::commands::Report;

#[derive(Parser, Debug)]
#[command(name = "bessel-zeros")]
#[command(about = "Zeros of the Bessel function of the first kind, in argument and in order")]
struct Args {
    /// TOML file with table and search settings
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Read the root table from this file instead of the bundled one
    #[arg(long, value_name = "PATH", global = true, conflicts_with = "no_table")]
    table: Option<PathBuf>,

    /// Compute every zero explicitly, ignoring the root table
    #[arg(long, global = true)]
    no_table: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Zero number N of J_order
    Zero {
        #[arg(long)]
        order: f64,
        #[arg(long, short = 'n')]
        number: usize,
        #[arg(long, short, default_value_t = 4)]
        resolution: u32,
    },
    /// First zero of J_order after START
    ZeroAfter {
        #[arg(long)]
        order: f64,
        #[arg(long)]
        start: f64,
        #[arg(long, short, default_value_t = 4)]
        resolution: u32,
    },
    /// First COUNT zeros of J_order
    Zeros {
        #[arg(long)]
        order: f64,
        #[arg(long)]
        count: usize,
        #[arg(long, short, default_value_t = 4)]
        resolution: u32,
    },
    /// Every order for which ROOT is a zero
    Indices {
        #[arg(long)]
        root: f64,
        #[arg(long, short, default_value_t = 4)]
        resolution: u32,
    },
    /// First extremum of J_order after START
    Extremum {
        #[arg(long)]
        order: f64,
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        #[arg(long, short, default_value_t = 4)]
        resolution: u32,
    },
    /// Value of J_order(argument)
    Eval {
        #[arg(long)]
        order: f64,
        #[arg(long)]
        argument: f64,
        #[arg(long)]
        digits: Option<u32>,
    },
    /// Generate a root table file
    BuildTable {
        /// Orders 0..ORDERS are tabulated
        #[arg(long, default_value_t = 101)]
        orders: u32,
        /// Zeros per order
        #[arg(long, default_value_t = 100)]
        count: usize,
        #[arg(long, default_value_t = TRUNCATION_PRECISION)]
        precision: u32,
        #[arg(long, short, value_name = "PATH")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(args.verbose);

    let config = load_config(&args)?;
    debug!(?config, "configuration");

    let report = commands::run(args.command, config)?;
    print_report(&report, args.json)
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("zeros_core=debug,zeros_cli=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<RootsConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => RootsConfig::default(),
    };
    if let Some(path) = &args.table {
        config.table = TableSource::File {
            path: path.clone(),
            precision: TRUNCATION_PRECISION,
        };
    }
    if args.no_table {
        config.table = TableSource::Disabled;
    }
    Ok(config)
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("Failed to serialize result")?;
        println!("{text}");
    } else {
        println!("{report}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, Args, Command};
    use clap::Parser;
    use zeros_core::TableSource;

    #[test]
    fn parses_zero_command() {
        let args = Args::try_parse_from([
            "bessel-zeros", "zero", "--order", "0", "-n", "2", "-r", "6",
        ])
        .expect("arguments should parse");
        match args.command {
            Command::Zero {
                order,
                number,
                resolution,
            } => {
                assert_eq!(order, 0.0);
                assert_eq!(number, 2);
                assert_eq!(resolution, 6);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn table_flags_override_config() {
        let args = Args::try_parse_from(["bessel-zeros", "--no-table", "indices", "--root", "5.5201"])
            .expect("arguments should parse");
        let config = load_config(&args).expect("config should load");
        assert_eq!(config.table, TableSource::Disabled);

        let args = Args::try_parse_from([
            "bessel-zeros", "zeros", "--order", "1", "--count", "3", "--table", "zeros.tsv",
        ])
        .expect("arguments should parse");
        let config = load_config(&args).expect("config should load");
        assert!(matches!(config.table, TableSource::File { .. }));
    }

    #[test]
    fn conflicting_table_flags_are_rejected() {
        let result = Args::try_parse_from([
            "bessel-zeros", "--no-table", "--table", "zeros.tsv", "eval", "--order", "0",
            "--argument", "1",
        ]);
        assert!(result.is_err());
    }
}
