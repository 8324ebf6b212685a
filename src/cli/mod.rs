//! Command-line parsing for `fitdata`.
//!
//! Argument parsing and dispatch stay separate from the data and model code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fitdata", version, about = "Inspect, filter and generate curve-fitting datasets")]
pub struct Cli {
    /// Log level for diagnostics on stderr (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a CSV file, bind roles, filter records and print column statistics.
    Stats(StatsArgs),
    /// Generate a noisy dataset from a builtin function.
    Sample(SampleArgs),
    /// List the builtin functions.
    Functions,
}

#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    /// CSV file; the first row is a header when every cell in it is text.
    pub csv: PathBuf,

    /// Column for x (name or 1-based index).
    #[arg(long)]
    pub x: Option<String>,

    /// Column for the x uncertainty.
    #[arg(long)]
    pub xerr: Option<String>,

    /// Column for y.
    #[arg(long)]
    pub y: Option<String>,

    /// Column for the y uncertainty.
    #[arg(long)]
    pub yerr: Option<String>,

    /// Do not derive unset roles from column order.
    #[arg(long)]
    pub no_search: bool,

    #[arg(long, allow_negative_numbers = true)]
    pub xmin: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub xmax: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub ymin: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub ymax: Option<f64>,

    /// Print the dataset payload as JSON instead of the table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Builtin function name (see `fitdata functions`).
    #[arg(short = 'f', long, default_value = "linear")]
    pub function: String,

    /// Parameter values, comma separated.
    #[arg(short = 'a', long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
    pub a: Vec<f64>,

    /// Number of records.
    #[arg(short = 'n', long, default_value_t = 20)]
    pub count: usize,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub xmin: f64,

    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub xmax: f64,

    /// Noise standard deviation on x.
    #[arg(long, default_value_t = 0.0)]
    pub xsigma: f64,

    /// Noise standard deviation on y.
    #[arg(long, default_value_t = 0.5)]
    pub ysigma: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Print the dataset payload as JSON instead of the table.
    #[arg(long)]
    pub json: bool,
}
