//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module parses the CLI,
//! installs logging, resolves arguments into config structs and prints
//! reports.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, SampleArgs, StatsArgs};
use crate::data::{generate_sample, ColumnRef, FittingData, Role, RoleHints, SampleConfig};
use crate::error::{Error, Result};
use crate::io::ingest::read_csv_grid;
use crate::math::Interval;
use crate::models::{library, FunctionRegistry, ParametricFunction};

/// Resolved settings for `fitdata stats`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsConfig {
    pub csv: PathBuf,
    pub hints: RoleHints,
    pub x_domain: Interval,
    pub y_domain: Interval,
    pub json: bool,
}

/// Entry point for the `fitdata` binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init_logging(&cli.log_level)?;

    match cli.command {
        Command::Stats(args) => handle_stats(&stats_config_from_args(&args)),
        Command::Sample(args) => handle_sample(&args),
        Command::Functions => {
            print!("{}", crate::report::format_functions(&FunctionRegistry::with_builtins()));
            Ok(())
        }
    }
}

fn handle_stats(config: &StatsConfig) -> Result<()> {
    let data = load_stats(config)?;
    if config.json {
        println!("{}", data.serialize().to_json()?);
    } else {
        print!("{}", crate::report::format_statistics(&data));
    }
    Ok(())
}

fn handle_sample(args: &SampleArgs) -> Result<()> {
    let function = resolve_function(&args.function)?;
    let config = sample_config_from_args(args);
    let data = generate_sample(&function, &args.a, &config)?;
    info!(function = %args.function, records = config.count, "generated sample");

    if args.json {
        println!("{}", data.serialize().to_json()?);
    } else {
        print!("{}", crate::report::format_statistics(&data));
    }
    Ok(())
}

/// Read the CSV, bind roles and apply the domain filters.
pub fn load_stats(config: &StatsConfig) -> Result<FittingData> {
    let grid = read_csv_grid(&config.csv)?;
    let mut data = FittingData::from_raw(grid, config.hints.clone())?;
    info!(
        path = %config.csv.display(),
        records = data.number_of_records(),
        columns = data.number_of_columns(),
        "loaded dataset"
    );

    if config.x_domain != Interval::unbounded() {
        data.select_by_x_domain(config.x_domain.min, config.x_domain.max, true)?;
    }
    if config.y_domain != Interval::unbounded() {
        data.select_by_y_domain(config.y_domain.min, config.y_domain.max, true)?;
    }
    if data.non_selected() && data.number_of_records() > 0 {
        return Err(Error::EmptyData("no records left after domain filtering"));
    }
    Ok(data)
}

pub fn stats_config_from_args(args: &StatsArgs) -> StatsConfig {
    let mut hints = RoleHints::default().search(!args.no_search);
    for (role, column) in [
        (Role::X, &args.x),
        (Role::Xerr, &args.xerr),
        (Role::Y, &args.y),
        (Role::Yerr, &args.yerr),
    ] {
        if let Some(column) = column {
            hints = hints.with(role, column_ref(column));
        }
    }

    StatsConfig {
        csv: args.csv.clone(),
        hints,
        x_domain: Interval::new(args.xmin, args.xmax),
        y_domain: Interval::new(args.ymin, args.ymax),
        json: args.json,
    }
}

pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        count: args.count,
        xmin: args.xmin,
        xmax: args.xmax,
        xsigma: args.xsigma,
        ysigma: args.ysigma,
        seed: args.seed,
    }
}

/// A builtin by name, or `polynomial_<degree>`.
pub fn resolve_function(name: &str) -> Result<Arc<ParametricFunction>> {
    if let Some(degree) = name.strip_prefix("polynomial_") {
        let degree = degree
            .parse()
            .map_err(|_| Error::Load(format!("invalid polynomial degree in {name:?}")))?;
        return library::polynomial(degree);
    }
    FunctionRegistry::with_builtins().load(name)
}

/// All-digit arguments select a column by position; anything else by name.
fn column_ref(text: &str) -> ColumnRef {
    match text.parse::<usize>() {
        Ok(index) => ColumnRef::Index(index),
        Err(_) => ColumnRef::Name(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn stats_args(csv: PathBuf) -> StatsArgs {
        StatsArgs {
            csv,
            x: None,
            xerr: None,
            y: None,
            yerr: None,
            no_search: false,
            xmin: None,
            xmax: None,
            ymin: None,
            ymax: None,
            json: false,
        }
    }

    fn write_csv(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fitdata-app-{}-{name}.csv", std::process::id()));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn column_arguments_resolve_by_index_or_name() {
        assert_eq!(column_ref("3"), ColumnRef::Index(3));
        assert_eq!(column_ref("time"), ColumnRef::Name("time".to_string()));
    }

    #[test]
    fn config_carries_hints_and_domains() {
        let mut args = stats_args(PathBuf::from("in.csv"));
        args.y = Some("speed".to_string());
        args.no_search = true;
        args.xmin = Some(1.0);
        let config = stats_config_from_args(&args);
        assert_eq!(config.hints, RoleHints::none().with(Role::Y, "speed"));
        assert_eq!(config.x_domain, Interval::new(Some(1.0), None));
        assert_eq!(config.y_domain, Interval::unbounded());
    }

    #[test]
    fn stats_pipeline_filters_records() {
        let path = write_csv("filter", "t,dt,v\n1,0.1,10\n2,0.1,20\n3,0.1,30\n4,0.1,40\n");
        let mut args = stats_args(path.clone());
        args.xmin = Some(2.0);
        args.ymax = Some(30.0);
        let data = load_stats(&stats_config_from_args(&args)).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(data.x_column(), Some("t"));
        assert_eq!(data.xerr_column(), Some("dt"));
        assert_eq!(data.y_column(), Some("v"));
        assert_eq!(data.records_indices(), &[false, true, true, false]);
    }

    #[test]
    fn filtering_everything_out_is_an_error() {
        let path = write_csv("empty", "1,2\n3,4\n");
        let mut args = stats_args(path.clone());
        args.xmin = Some(100.0);
        let result = load_stats(&stats_config_from_args(&args));
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(Error::EmptyData(_))));
    }

    #[test]
    fn domain_filter_needs_a_bound_role() {
        let path = write_csv("norole", "a\n1\n2\n");
        let mut args = stats_args(path.clone());
        args.no_search = true;
        args.ymin = Some(0.0);
        let result = load_stats(&stats_config_from_args(&args));
        fs::remove_file(&path).ok();
        assert_eq!(result.unwrap_err(), Error::MissingRole(Role::Y));
    }

    #[test]
    fn functions_resolve_from_builtins_and_polynomials() {
        assert_eq!(resolve_function("normal").unwrap().number_of_parameters(), 4);
        assert_eq!(resolve_function("polynomial_3").unwrap().number_of_parameters(), 4);
        assert!(matches!(resolve_function("polynomial_x"), Err(Error::Load(_))));
        assert!(matches!(resolve_function("missing"), Err(Error::Load(_))));
    }
}
