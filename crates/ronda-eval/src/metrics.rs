//! Risk and performance metrics of return series.
//!
//! Every metric is a pure function of the defined returns of one series.
//! Undefined periods are dropped before computing, and a metric that cannot be
//! computed (too few periods, zero dispersion) is `None`.

use polars::prelude::*;
use ronda_traits::{Result, stats};
use serde::{Deserialize, Serialize};

use crate::returns::ReturnSeries;

/// Configuration for metrics calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Annual risk-free rate subtracted in Sharpe and Sortino ratios.
    pub risk_free_rate: f64,
    /// Number of periods per year used for annualization.
    pub periods_per_year: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
            periods_per_year: 12,
        }
    }
}

/// Summary statistics of one strategy's return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Strategy name.
    pub strategy: String,
    /// Number of defined period returns.
    pub n_periods: usize,
    /// Compounded return over all periods.
    pub total_return: Option<f64>,
    /// Geometric annualized return.
    pub annualized_return: Option<f64>,
    /// Sample std of period returns, annualized.
    pub annualized_volatility: Option<f64>,
    /// Excess annualized return per unit of annualized volatility.
    pub sharpe: Option<f64>,
    /// Excess annualized return per unit of annualized downside deviation.
    pub sortino: Option<f64>,
    /// Worst peak-to-trough decline of cumulative wealth, in `[-1, 0]`.
    pub max_drawdown: Option<f64>,
    /// Fraction of periods with a positive return.
    pub win_rate: Option<f64>,
}

/// Compounded wealth after each period, starting from 1.
#[must_use]
pub fn cumulative_wealth(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |wealth, r| {
            *wealth *= 1.0 + r;
            Some(*wealth)
        })
        .collect()
}

/// Maximum drawdown of the wealth curve built from `returns`.
///
/// The running peak covers the realized wealth points only, so a series
/// that falls from the first period on measures its drawdown from the
/// first period's wealth.
#[must_use]
pub fn max_drawdown(returns: &[f64]) -> Option<f64> {
    let wealth = cumulative_wealth(returns);
    let mut peak = f64::NEG_INFINITY;
    let mut worst: Option<f64> = None;
    for w in wealth {
        peak = peak.max(w);
        let dd = if peak > 0.0 { (w / peak - 1.0).clamp(-1.0, 0.0) } else { -1.0 };
        worst = Some(worst.map_or(dd, |m| m.min(dd)));
    }
    worst
}

/// Computes [`PerformanceMetrics`] from return series.
#[derive(Debug, Clone, Default)]
pub struct PerformanceAnalyzer {
    config: PerformanceConfig,
}

impl PerformanceAnalyzer {
    /// Create an analyzer.
    #[must_use]
    pub const fn new(config: PerformanceConfig) -> Self {
        Self { config }
    }

    /// Analyzer configuration.
    #[must_use]
    pub const fn config(&self) -> &PerformanceConfig {
        &self.config
    }

    /// Metrics of a named series of period returns.
    #[must_use]
    pub fn metrics(&self, strategy: &str, returns: &[f64]) -> PerformanceMetrics {
        let n = returns.len();
        let a = f64::from(self.config.periods_per_year);
        let rf = self.config.risk_free_rate;

        let growth = (n > 0).then(|| returns.iter().map(|r| 1.0 + r).product::<f64>());
        let total_return = growth.map(|g| g - 1.0);
        let annualized_return = growth
            .filter(|g| *g >= 0.0)
            .map(|g| g.powf(a / n as f64) - 1.0)
            .filter(|r| r.is_finite());

        let annualized_volatility = stats::sample_std(returns).map(|s| s * a.sqrt());
        let sharpe = ratio(annualized_return.map(|r| r - rf), annualized_volatility);

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_deviation = stats::sample_std(&downside).map(|s| s * a.sqrt());
        let sortino = ratio(annualized_return.map(|r| r - rf), downside_deviation);

        let win_rate = (n > 0).then(|| returns.iter().filter(|r| **r > 0.0).count() as f64 / n as f64);

        PerformanceMetrics {
            strategy: strategy.to_string(),
            n_periods: n,
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe,
            sortino,
            max_drawdown: max_drawdown(returns),
            win_rate,
        }
    }

    /// Metrics of `series`, ignoring undefined periods.
    #[must_use]
    pub fn analyze(&self, series: &ReturnSeries) -> PerformanceMetrics {
        self.metrics(&series.name, &series.defined())
    }

    /// Report over several series, in the given order.
    #[must_use]
    pub fn report(&self, series: &[ReturnSeries]) -> PerformanceReport {
        PerformanceReport {
            strategies: series.iter().map(|s| self.analyze(s)).collect(),
        }
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (num, den) = (numerator?, denominator?);
    if den <= stats::MIN_STD_THRESHOLD {
        return None;
    }
    Some(num / den).filter(|v| v.is_finite())
}

/// Performance metrics keyed by strategy name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    strategies: Vec<PerformanceMetrics>,
}

impl PerformanceReport {
    /// All strategies, in report order.
    #[must_use]
    pub fn strategies(&self) -> &[PerformanceMetrics] {
        &self.strategies
    }

    /// Metrics of one strategy.
    #[must_use]
    pub fn get(&self, strategy: &str) -> Option<&PerformanceMetrics> {
        self.strategies.iter().find(|m| m.strategy == strategy)
    }

    /// Strategies with at least `min_periods` defined returns.
    #[must_use]
    pub fn summary(&self, min_periods: usize) -> Self {
        Self {
            strategies: self
                .strategies
                .iter()
                .filter(|m| m.n_periods >= min_periods)
                .cloned()
                .collect(),
        }
    }

    /// One row per strategy.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let col = |f: fn(&PerformanceMetrics) -> Option<f64>| -> Vec<Option<f64>> {
            self.strategies.iter().map(f).collect()
        };
        let names: Vec<&str> = self.strategies.iter().map(|m| m.strategy.as_str()).collect();
        let periods: Vec<u64> = self.strategies.iter().map(|m| m.n_periods as u64).collect();

        Ok(df! {
            "strategy" => names,
            "n_periods" => periods,
            "total_return" => col(|m| m.total_return),
            "annualized_return" => col(|m| m.annualized_return),
            "annualized_volatility" => col(|m| m.annualized_volatility),
            "sharpe" => col(|m| m.sharpe),
            "sortino" => col(|m| m.sortino),
            "max_drawdown" => col(|m| m.max_drawdown),
            "win_rate" => col(|m| m.win_rate),
        }?)
    }
}

/// Pairwise Pearson correlations between return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlate every pair of `series` over the periods where both are
    /// defined.
    #[must_use]
    pub fn from_series(series: &[&ReturnSeries]) -> Self {
        let aligned: Vec<_> = series.iter().map(|s| s.by_end()).collect();
        let values = aligned
            .iter()
            .map(|a| {
                aligned
                    .iter()
                    .map(|b| {
                        let (x, y): (Vec<f64>, Vec<f64>) = a
                            .iter()
                            .filter_map(|(end, va)| Some(((*va)?, b.get(end).copied().flatten()?)))
                            .unzip();
                        stats::pearson(&x, &y)
                    })
                    .collect()
            })
            .collect();

        Self {
            names: series.iter().map(|s| s.name.clone()).collect(),
            values,
        }
    }

    /// Series names, in matrix order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Correlation of two named series.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        self.values[i][j]
    }

    /// Square frame with a leading `strategy` column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = vec![Column::new("strategy".into(), self.names.clone())];
        for (j, name) in self.names.iter().enumerate() {
            let column: Vec<Option<f64>> = self.values.iter().map(|row| row[j]).collect();
            columns.push(Column::new(name.as_str().into(), column));
        }
        Ok(DataFrame::new(columns)?)
    }
}
