//! Score command implementation.

use std::cmp::Ordering;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ronda_combine::CrossSectionalNormalizer;
use ronda_data::parse_date;
use ronda_eval::Backtest;
use ronda_signals::FactorComputer;
use ronda_traits::{Date, calendar};

use crate::data;

/// Options for `ronda score`.
#[derive(Debug)]
pub(crate) struct ScoreArgs {
    pub(crate) data: PathBuf,
    pub(crate) config: Option<PathBuf>,
    pub(crate) date: Option<String>,
    pub(crate) top: usize,
    pub(crate) raw: bool,
}

/// Show factor and composite scores for one rebalance date.
pub(crate) fn show_scores(args: &ScoreArgs) -> Result<()> {
    let config = data::load_config(args.config.as_deref())?;
    let store = data::load_store(&args.data, config.liveness_tolerance_days)?;
    let (_, last) = store.date_range().context("data file holds no observations")?;

    let date: Date = match &args.date {
        Some(d) => calendar::month_end(parse_date(d)?),
        None if calendar::is_month_end(last) => last,
        None => calendar::months_back(last, 1).context("no complete month in data")?,
    };

    let backtest = Backtest::new(config);
    let universes = backtest.universes(&store, &[date]);
    let panel = FactorComputer::from_config(&backtest.config().factors)?.compute(&store, &universes)?;
    let normalized = CrossSectionalNormalizer::new().normalize(&panel);
    let composite = normalized.composite(backtest.config().composite.build()?.as_ref())?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Signal Scores                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Date:     {date}");
    println!("Universe: {} instruments", universes.get(&date).map_or(0, |u| u.len()));
    println!("Method:   {}", composite.method());
    println!();

    let mut rows: Vec<(String, Option<f64>)> = panel
        .universe(date)
        .into_iter()
        .map(|symbol| {
            let score = composite.score(date, &symbol);
            (symbol, score)
        })
        .collect();
    rows.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.0.cmp(&b.0)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    let factors = normalized.factors();
    print!("{:<10} {:>10}", "Symbol", "Composite");
    for factor in factors {
        print!(" {factor:>11}");
    }
    println!();
    println!("{}", "─".repeat(21 + 12 * factors.len()));

    let fmt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
    for (symbol, score) in rows.iter().take(args.top) {
        print!("{symbol:<10} {:>10}", fmt(*score));
        for factor in factors {
            let value = if args.raw {
                panel.raw_value(date, factor, symbol)
            } else {
                normalized.z_score(date, factor, symbol)
            };
            print!(" {:>11}", fmt(value));
        }
        println!();
    }
    println!();

    if args.raw {
        println!("Factor columns show raw values; composite is built from z-scores");
    } else {
        println!("Factor columns are cross-sectional z-scores oriented so higher is better");
    }
    println!();
    Ok(())
}
