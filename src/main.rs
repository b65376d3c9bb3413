use std::io;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;

use eseries_fit::{write_report, Search, SeriesKind};

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Rank standard E-series component values by how close a formula gets to a
/// target value.
#[derive(Parser, Debug)]
#[command(name = "eseries-fit", version)]
struct Cli {
    /// Formula whose value should land on the target,
    /// e.g. "20*log10(1+r1/r2)"
    formula: String,

    /// Target value for the formula
    target: f64,

    /// Standard series to draw candidate values from
    #[arg(long, value_enum, default_value = "e12")]
    series: SeriesKind,

    /// Decade multipliers applied to every series mantissa
    #[arg(long, value_delimiter = ',', default_values_t = [1e2, 1e3, 1e4, 1e5, 1e6])]
    multipliers: Vec<f64>,

    /// Fixed constant binding as NAME=VALUE (e.g. iq=50e-6); may be repeated
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_constant)]
    constants: Vec<(String, f64)>,

    /// Log verbosity
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

fn parse_constant(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad value in '{}': {}", s, e))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level.to_filter())
        .init();

    let objective = format!("abs(({})-({}))", cli.formula, cli.target);
    let mut search = Search::new(&objective, &cli.formula, &cli.constants)?;

    let grid = cli.series.series().grid(&cli.multipliers);
    for name in search.variables() {
        search.set_grid(&name, grid.clone())?;
    }
    info!("{} combinations to evaluate", search.combinations());

    let results = search.run()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &cli.formula, &results)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_flag_parses() {
        assert_eq!(
            parse_constant("iq=50e-6").unwrap(),
            ("iq".to_string(), 50e-6)
        );
        assert!(parse_constant("iq").is_err());
        assert!(parse_constant("iq=five").is_err());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["eseries-fit", "20*log10(1+r1/r2)", "24"]);
        assert_eq!(cli.target, 24.0);
        assert_eq!(cli.series, SeriesKind::E12);
        assert_eq!(cli.multipliers, [1e2, 1e3, 1e4, 1e5, 1e6]);
        assert!(cli.constants.is_empty());
    }
}
