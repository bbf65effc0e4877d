//! ronda CLI binary.
//!
//! Command-line adapter over the ronda factor backtester: loads a long-format
//! CSV and an optional JSON config, runs the pipeline and prints or writes the
//! resulting tables.

mod cmd;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::run::RunArgs;
use cmd::score::ScoreArgs;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Factor-based long-only equity backtesting", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest over a market data file
    Run {
        /// Long-format CSV with symbol, date, price and fundamental columns
        data: PathBuf,

        /// JSON backtest configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// First rebalance date bound (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last rebalance date bound (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Directory for returns, summary and factor CSV files
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Hide strategies with fewer defined periods in the summary
        #[arg(long, default_value = "12")]
        min_periods: usize,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List available signals
    Signals {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show factor and composite scores at one date
    Score {
        /// Long-format CSV with symbol, date, price and fundamental columns
        data: PathBuf,

        /// JSON backtest configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scoring date (YYYY-MM-DD, defaults to the last complete month-end)
        #[arg(short, long)]
        date: Option<String>,

        /// Number of instruments to show
        #[arg(short, long, default_value = "20")]
        top: usize,

        /// Show raw factor values instead of z-scores
        #[arg(long)]
        raw: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ronda=info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            config,
            start,
            end,
            out,
            min_periods,
            format,
        } => cmd::run::run_backtest(&RunArgs {
            data,
            config,
            start,
            end,
            out,
            min_periods,
            format,
        }),
        Commands::Signals { category, verbose } => cmd::signals::list_signals(category.as_deref(), verbose),
        Commands::Score {
            data,
            config,
            date,
            top,
            raw,
        } => cmd::score::show_scores(&ScoreArgs {
            data,
            config,
            date,
            top,
            raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["ronda", "run", "market.csv", "--out", "results", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Run {
                data, out, format, min_periods, ..
            } => {
                assert_eq!(data, PathBuf::from("market.csv"));
                assert_eq!(out, Some(PathBuf::from("results")));
                assert_eq!(format, "json");
                assert_eq!(min_periods, 12);
            }
            _ => panic!("expected run"),
        }
    }
}
