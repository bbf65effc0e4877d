//! Backtest command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use ronda_data::parse_date;
use ronda_eval::{Backtest, BacktestResult, returns_frame};

use crate::data;

/// Options for `ronda run`.
#[derive(Debug)]
pub(crate) struct RunArgs {
    pub(crate) data: PathBuf,
    pub(crate) config: Option<PathBuf>,
    pub(crate) start: Option<String>,
    pub(crate) end: Option<String>,
    pub(crate) out: Option<PathBuf>,
    pub(crate) min_periods: usize,
    pub(crate) format: String,
}

/// Run the backtest and print or write its results.
pub(crate) fn run_backtest(args: &RunArgs) -> Result<()> {
    let mut config = data::load_config(args.config.as_deref())?;
    if let Some(start) = &args.start {
        config.start_date = Some(parse_date(start)?);
    }
    if let Some(end) = &args.end {
        config.end_date = Some(parse_date(end)?);
    }
    config.validate()?;

    let store = data::load_store(&args.data, config.liveness_tolerance_days)?;
    let result = Backtest::new(config).run(&store)?;

    match args.format.as_str() {
        "text" => print_text(&result, args.min_periods),
        "json" => println!("{}", serde_json::to_string_pretty(&result.report.summary(args.min_periods))?),
        other => bail!("unknown format '{other}', expected text or json"),
    }

    if let Some(out) = &args.out {
        write_outputs(&result, out)?;
        println!("Results written to {}", out.display());
    }
    Ok(())
}

fn write_outputs(result: &BacktestResult, out: &Path) -> Result<()> {
    data::write_csv(&mut returns_frame(&result.returns)?, &out.join("returns.csv"))?;
    data::write_csv(&mut result.report.to_frame()?, &out.join("summary.csv"))?;
    data::write_csv(&mut result.factor_correlations().to_frame()?, &out.join("correlations.csv"))?;
    data::write_csv(&mut result.factors.to_frame()?, &out.join("factors.csv"))?;
    data::write_csv(&mut result.normalized.to_frame()?, &out.join("zscores.csv"))?;
    Ok(())
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn print_text(result: &BacktestResult, min_periods: usize) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                       Backtesting                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    if let (Some(first), Some(last)) = (result.rebalance_dates.first(), result.rebalance_dates.last()) {
        println!("Period:     {first} to {last}");
    }
    println!("Rebalances: {}", result.rebalance_dates.len());
    println!();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("PERFORMANCE SUMMARY");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    println!(
        "{:<12} {:>7} {:>10} {:>9} {:>7} {:>8} {:>9} {:>8}",
        "Strategy", "Periods", "Ann. Ret", "Ann. Vol", "Sharpe", "Sortino", "Max DD", "Win"
    );
    println!("{}", "─".repeat(77));
    for m in result.report.summary(min_periods).strategies() {
        println!(
            "{:<12} {:>7} {:>10} {:>9} {:>7} {:>8} {:>9} {:>8}",
            m.strategy,
            m.n_periods,
            pct(m.annualized_return),
            pct(m.annualized_volatility),
            ratio(m.sharpe),
            ratio(m.sortino),
            pct(m.max_drawdown),
            pct(m.win_rate),
        );
    }
    println!();

    let corr = result.factor_correlations();
    if corr.names().len() > 1 {
        println!("Factor return correlations:");
        print!("{:<12}", "");
        for name in corr.names() {
            print!(" {name:>11}");
        }
        println!();
        for a in corr.names() {
            print!("{a:<12}");
            for b in corr.names() {
                print!(" {:>11}", ratio(corr.get(a, b)));
            }
            println!();
        }
        println!();
    }
}
