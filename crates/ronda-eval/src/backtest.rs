//! Backtest pipeline.
//!
//! Runs the full chain for one configuration: live universes per rebalance
//! date, raw factors, cross-sectional z-scores, composite scores, top-quantile
//! portfolios, holding-period returns and performance metrics. Strategies are
//! one portfolio per factor, one `combined` portfolio on the composite score,
//! and the `benchmark`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use ronda_combine::{CompositeConfig, CompositePanel, CrossSectionalNormalizer, NormalizedPanel};
use ronda_data::{DEFAULT_LIVENESS_TOLERANCE_DAYS, TimeSeriesStore};
use ronda_signals::{FactorComputer, FactorConfig, FactorPanel};
use ronda_traits::{Date, Result, RondaError, Symbol, calendar};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::metrics::{CorrelationMatrix, PerformanceAnalyzer, PerformanceConfig, PerformanceReport};
use crate::portfolio::{DEFAULT_QUANTILE, Portfolio, PortfolioConstructor};
use crate::returns::{BenchmarkMethod, MissingPricePolicy, ReturnComposer, ReturnSeries};

/// Strategy name of the composite-score portfolio.
pub const COMBINED: &str = "combined";

/// Largest accepted `liveness_tolerance_days`.
pub const MAX_LIVENESS_TOLERANCE_DAYS: i64 = 366;

/// Strategy name of the benchmark series.
pub const BENCHMARK: &str = "benchmark";

/// How often portfolios are rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceFrequency {
    /// Every month-end.
    #[default]
    Monthly,
    /// Every third month-end.
    Quarterly,
}

impl RebalanceFrequency {
    /// Months between rebalance dates.
    #[must_use]
    pub const fn step_months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
        }
    }

    /// Holding periods per year.
    #[must_use]
    pub const fn periods_per_year(&self) -> u32 {
        12 / self.step_months()
    }
}

/// Backtesting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Restrict the investable universe to these symbols (default: all).
    pub universe: Option<Vec<Symbol>>,
    /// First rebalance date bound (default: first observation).
    pub start_date: Option<Date>,
    /// Last rebalance date bound (default: last observation).
    pub end_date: Option<Date>,
    /// Rebalance frequency.
    pub rebalance_frequency: RebalanceFrequency,
    /// Fraction of the ranked cross-section held.
    pub quantile: f64,
    /// Minimum ranked instruments needed to form a portfolio.
    pub min_cross_section: usize,
    /// Days a price may be stale and the instrument still count as live.
    pub liveness_tolerance_days: i64,
    /// Factor selection and parameters.
    pub factors: FactorConfig,
    /// Composite score construction.
    pub composite: CompositeConfig,
    /// Treatment of held instruments without a period return.
    pub missing_price_policy: MissingPricePolicy,
    /// Benchmark construction.
    pub benchmark: BenchmarkMethod,
    /// Annual risk-free rate.
    pub risk_free_rate: f64,
    /// Annualization factor (default: derived from the rebalance frequency).
    pub periods_per_year: Option<u32>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            universe: None,
            start_date: None,
            end_date: None,
            rebalance_frequency: RebalanceFrequency::Monthly,
            quantile: DEFAULT_QUANTILE,
            min_cross_section: 1,
            liveness_tolerance_days: DEFAULT_LIVENESS_TOLERANCE_DAYS,
            factors: FactorConfig::default(),
            composite: CompositeConfig::default(),
            missing_price_policy: MissingPricePolicy::ZeroContribution,
            benchmark: BenchmarkMethod::EqualWeight,
            risk_free_rate: 0.02,
            periods_per_year: None,
        }
    }
}

impl BacktestConfig {
    /// Parse a JSON configuration. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Annualization factor in effect.
    #[must_use]
    pub fn effective_periods_per_year(&self) -> u32 {
        self.periods_per_year
            .unwrap_or_else(|| self.rebalance_frequency.periods_per_year())
    }

    /// Performance settings derived from this configuration.
    #[must_use]
    pub fn performance(&self) -> PerformanceConfig {
        PerformanceConfig {
            risk_free_rate: self.risk_free_rate,
            periods_per_year: self.effective_periods_per_year(),
        }
    }

    /// Check every option for range and consistency.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(RondaError::InvalidConfig(msg));

        PortfolioConstructor::new(self.quantile, self.min_cross_section)?;
        if !(0..=MAX_LIVENESS_TOLERANCE_DAYS).contains(&self.liveness_tolerance_days) {
            return invalid(format!(
                "liveness_tolerance_days must be in [0, {MAX_LIVENESS_TOLERANCE_DAYS}], got {}",
                self.liveness_tolerance_days
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return invalid(format!("start_date {start} is after end_date {end}"));
        }
        if !self.risk_free_rate.is_finite() {
            return invalid("risk_free_rate must be finite".to_string());
        }
        if self.effective_periods_per_year() == 0 {
            return invalid("periods_per_year must be positive".to_string());
        }
        if self.factors.enabled.is_empty() {
            return invalid("at least one factor must be enabled".to_string());
        }
        if self.universe.as_ref().is_some_and(Vec::is_empty) {
            return invalid("universe list is empty".to_string());
        }
        if let BenchmarkMethod::Index { symbol } = &self.benchmark
            && symbol.trim().is_empty()
        {
            return invalid("benchmark index symbol is empty".to_string());
        }
        FactorComputer::from_config(&self.factors)?;
        self.composite.build()?;
        Ok(())
    }
}

/// Everything produced by one backtest run.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// Rebalance dates, ascending.
    pub rebalance_dates: Vec<Date>,
    /// Live investable universe per rebalance date.
    pub universes: BTreeMap<Date, BTreeSet<Symbol>>,
    /// Raw factor values.
    pub factors: FactorPanel,
    /// Cross-sectional z-scores.
    pub normalized: NormalizedPanel,
    /// Composite scores.
    pub composite: CompositePanel,
    /// Portfolios per strategy and rebalance date.
    pub portfolios: BTreeMap<String, BTreeMap<Date, Portfolio>>,
    /// Return series: factors in configuration order, then `combined`, then
    /// `benchmark`.
    pub returns: Vec<ReturnSeries>,
    /// Metrics per strategy, in the same order as `returns`.
    pub report: PerformanceReport,
}

impl BacktestResult {
    /// Return series of one strategy.
    #[must_use]
    pub fn series(&self, strategy: &str) -> Option<&ReturnSeries> {
        self.returns.iter().find(|s| s.name == strategy)
    }

    /// Excess returns of `strategy` over the benchmark.
    #[must_use]
    pub fn excess_returns(&self, strategy: &str) -> Option<ReturnSeries> {
        Some(self.series(strategy)?.excess_over(self.series(BENCHMARK)?))
    }

    /// Correlations between the single-factor strategies.
    #[must_use]
    pub fn factor_correlations(&self) -> CorrelationMatrix {
        let factor_series: Vec<&ReturnSeries> = self
            .returns
            .iter()
            .filter(|s| s.name != COMBINED && s.name != BENCHMARK)
            .collect();
        CorrelationMatrix::from_series(&factor_series)
    }
}

/// Backtesting engine.
#[derive(Debug, Clone, Default)]
pub struct Backtest {
    config: BacktestConfig,
}

impl Backtest {
    /// Create a new backtest with configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use ronda_eval::{Backtest, BacktestConfig};
    ///
    /// let backtest = Backtest::new(BacktestConfig::default());
    /// assert_eq!(backtest.config().quantile, 0.2);
    /// ```
    #[must_use]
    pub const fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// Backtest configuration.
    #[must_use]
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Rebalance dates for `store` under the configured range and frequency.
    ///
    /// Data ending before its final calendar month-end (daily prices stopping
    /// on the last trading day) still rebalances at that month-end when some
    /// instrument is live there.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::NoUsableData`] if the store is empty.
    pub fn rebalance_dates(&self, store: &TimeSeriesStore) -> Result<Vec<Date>> {
        let (first, last) = store
            .date_range()
            .ok_or_else(|| RondaError::NoUsableData("store holds no observations".to_string()))?;
        let data_end = calendar::month_end(last);
        let data_end = if store
            .universe_within(data_end, self.config.liveness_tolerance_days)
            .is_empty()
        {
            last
        } else {
            data_end
        };
        let start = self.config.start_date.unwrap_or(first).max(first);
        let end = self.config.end_date.map_or(data_end, |e| e.min(data_end));
        Ok(calendar::month_ends(
            start,
            end,
            self.config.rebalance_frequency.step_months(),
        ))
    }

    /// Investable universe at each of `dates`.
    #[must_use]
    pub fn universes(&self, store: &TimeSeriesStore, dates: &[Date]) -> BTreeMap<Date, BTreeSet<Symbol>> {
        let allowed: Option<BTreeSet<&str>> = self
            .config
            .universe
            .as_ref()
            .map(|u| u.iter().map(String::as_str).collect());
        let index = match &self.config.benchmark {
            BenchmarkMethod::Index { symbol } => Some(symbol.as_str()),
            _ => None,
        };

        dates
            .iter()
            .map(|date| {
                let live = store
                    .universe_within(*date, self.config.liveness_tolerance_days)
                    .into_iter()
                    .filter(|s| allowed.as_ref().is_none_or(|a| a.contains(s.as_str())))
                    .filter(|s| Some(s.as_str()) != index)
                    .collect();
                (*date, live)
            })
            .collect()
    }

    /// Run the backtest.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidConfig`] for an invalid configuration and
    /// [`RondaError::NoUsableData`] when no strategy has a single defined
    /// period return. Per-instrument and per-date gaps never abort the run.
    pub fn run(&self, store: &TimeSeriesStore) -> Result<BacktestResult> {
        self.config.validate()?;

        let rebalance_dates = self.rebalance_dates(store)?;
        if rebalance_dates.len() < 2 {
            return Err(RondaError::NoUsableData(format!(
                "{} rebalance date(s) in range, need at least 2",
                rebalance_dates.len()
            )));
        }
        let universes = self.universes(store, &rebalance_dates);
        if universes.values().all(BTreeSet::is_empty) {
            return Err(RondaError::NoUsableData(
                "no live instruments at any rebalance date".to_string(),
            ));
        }
        info!(
            dates = rebalance_dates.len(),
            first = %rebalance_dates[0],
            last = %rebalance_dates[rebalance_dates.len() - 1],
            instruments = store.len(),
            "starting backtest"
        );

        let factors = FactorComputer::from_config(&self.config.factors)?.compute(store, &universes)?;
        let normalized = CrossSectionalNormalizer::new().normalize(&factors);
        let combiner = self.config.composite.build()?;
        let composite = normalized.composite(combiner.as_ref())?;

        let constructor = PortfolioConstructor::new(self.config.quantile, self.config.min_cross_section)?;
        let mut portfolios: BTreeMap<String, BTreeMap<Date, Portfolio>> = BTreeMap::new();
        let mut strategies: Vec<String> = Vec::new();
        for factor in normalized.factors() {
            let held = rebalance_dates
                .iter()
                .map(|date| (*date, constructor.construct(*date, &normalized.defined(*date, factor))))
                .collect();
            portfolios.insert(factor.clone(), held);
            strategies.push(factor.clone());
        }
        let held = rebalance_dates
            .iter()
            .map(|date| {
                let scores = composite.scores(*date).cloned().unwrap_or_default();
                (*date, constructor.construct(*date, &scores))
            })
            .collect();
        portfolios.insert(COMBINED.to_string(), held);
        strategies.push(COMBINED.to_string());

        let composer = ReturnComposer::new(self.config.missing_price_policy);
        let mut returns: Vec<ReturnSeries> = strategies
            .iter()
            .map(|name| composer.compose(name, store, &rebalance_dates, &portfolios[name]))
            .collect();
        returns.push(composer.benchmark(
            BENCHMARK,
            store,
            &rebalance_dates,
            &universes,
            &self.config.benchmark,
        )?);

        for series in &returns {
            debug!(
                strategy = %series.name,
                defined = series.defined().len(),
                periods = series.len(),
                "composed returns"
            );
        }
        if returns.iter().all(|s| s.defined().is_empty()) {
            return Err(RondaError::NoUsableData(
                "no strategy has a defined period return".to_string(),
            ));
        }

        let report = PerformanceAnalyzer::new(self.config.performance()).report(&returns);
        for m in report.strategies() {
            info!(
                strategy = %m.strategy,
                periods = m.n_periods,
                annualized_return = ?m.annualized_return,
                sharpe = ?m.sharpe,
                max_drawdown = ?m.max_drawdown,
                "strategy summary"
            );
        }

        Ok(BacktestResult {
            rebalance_dates,
            universes,
            factors,
            normalized,
            composite,
            portfolios,
            returns,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ronda_combine::CompositePolicy;
    use ronda_traits::Field;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    const SYMBOLS: [&str; 8] = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH"];
    const MONTHS: usize = 24;

    /// Deterministic synthetic market: 8 instruments over 24 month-ends from
    /// January 2022, quarterly fundamentals, one late lister and one delisting.
    /// Observations dated after `cutoff` are left out.
    fn market(cutoff: Option<Date>) -> TimeSeriesStore {
        let mut builder = TimeSeriesStore::builder();
        let keep = |date: Date| cutoff.is_none_or(|c| date <= c);

        for (k, symbol) in SYMBOLS.iter().enumerate() {
            let kf = k as f64;
            let mut price = 20.0 + 10.0 * kf;
            for m in 0..MONTHS {
                let date = calendar::months_back(d(2023, 12, 31), (MONTHS - 1 - m) as u32).unwrap();
                let drift = 0.004 * (kf - 3.5) + 0.03 * ((m as f64) * (0.7 + 0.3 * kf)).sin();
                price *= 1.0 + drift;

                let listed = !(*symbol == "GGG" && m < 6) && !(*symbol == "HHH" && m > 18);
                if listed && keep(date) {
                    builder.price(symbol, date, price).unwrap();
                }
                if m % 3 == 2 && keep(date) {
                    let scale = 100.0 + 5.0 * m as f64;
                    builder
                        .fundamental(symbol, Field::EarningsTtm, date, scale * (0.02 + 0.01 * ((kf * 1.3).cos())))
                        .unwrap()
                        .fundamental(symbol, Field::SharesOutstanding, date, 10.0 + kf)
                        .unwrap()
                        .fundamental(symbol, Field::GrossProfit, date, scale * (0.2 + 0.03 * kf))
                        .unwrap()
                        .fundamental(symbol, Field::TotalAssets, date, scale * (1.0 + 0.1 * (kf * 0.9).sin().abs()))
                        .unwrap();
                }
            }
        }
        builder.build()
    }

    fn config() -> BacktestConfig {
        let mut config = BacktestConfig::default();
        config.factors.momentum.lookback_months = 3;
        config.factors.volatility.window_months = 6;
        config.quantile = 0.25;
        config
    }

    #[test]
    fn test_config_defaults() {
        let config = BacktestConfig::default();
        assert_eq!(config.quantile, 0.2);
        assert_eq!(config.min_cross_section, 1);
        assert_eq!(config.liveness_tolerance_days, 7);
        assert_eq!(config.effective_periods_per_year(), 12);
        assert_eq!(config.composite.policy, CompositePolicy::MeanOfAvailable);
        assert_eq!(config.missing_price_policy, MissingPricePolicy::ZeroContribution);
        assert_eq!(config.benchmark, BenchmarkMethod::EqualWeight);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config = BacktestConfig::from_json_str(
            r#"{
                "rebalance_frequency": "quarterly",
                "quantile": 0.3,
                "start_date": "2022-06-30",
                "factors": { "enabled": ["momentum", "quality"], "momentum": { "lookback_months": 6 } },
                "composite": { "method": "rank_sum", "policy": "require_all" },
                "missing_price_policy": "renormalize",
                "benchmark": { "index": { "symbol": "SPY" } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.rebalance_frequency, RebalanceFrequency::Quarterly);
        assert_eq!(config.effective_periods_per_year(), 4);
        assert_eq!(config.start_date, Some(d(2022, 6, 30)));
        assert_eq!(config.factors.momentum.lookback_months, 6);
        assert_eq!(config.factors.momentum.skip_months, 1);
        assert_eq!(config.composite.policy, CompositePolicy::RequireAll);
        assert_eq!(
            config.benchmark,
            BenchmarkMethod::Index {
                symbol: "SPY".to_string()
            }
        );
    }

    #[test]
    fn test_config_validation() {
        let bad = [
            r#"{ "quantile": 0.0 }"#,
            r#"{ "min_cross_section": 0 }"#,
            r#"{ "start_date": "2024-01-31", "end_date": "2023-01-31" }"#,
            r#"{ "factors": { "enabled": [] } }"#,
            r#"{ "factors": { "enabled": ["carry"] } }"#,
            r#"{ "composite": { "method": "custom" } }"#,
            r#"{ "periods_per_year": 0 }"#,
        ];
        for json in bad {
            assert!(BacktestConfig::from_json_str(json).is_err(), "{json}");
        }
        assert!(matches!(
            BacktestConfig::from_json_str("{ not json"),
            Err(RondaError::Json(_))
        ));
    }

    #[test]
    fn test_run_strategies_and_bounds() {
        let store = market(None);
        let result = Backtest::new(config()).run(&store).unwrap();

        assert_eq!(result.rebalance_dates.len(), MONTHS);
        let names: Vec<&str> = result.returns.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["momentum", "value", "quality", "volatility", COMBINED, BENCHMARK]);
        assert!(result.returns.iter().all(|s| s.len() == MONTHS - 1));

        for m in result.report.strategies() {
            if let Some(dd) = m.max_drawdown {
                assert!((-1.0..=0.0).contains(&dd), "{}: {dd}", m.strategy);
            }
            if let Some(w) = m.win_rate {
                assert!((0.0..=1.0).contains(&w), "{}: {w}", m.strategy);
            }
        }
        assert!(result.report.get(COMBINED).unwrap().n_periods > 0);
        assert_eq!(result.report.get(BENCHMARK).unwrap().n_periods, MONTHS - 1);
    }

    #[test]
    fn test_portfolio_weights_sum_to_one() {
        let store = market(None);
        let result = Backtest::new(config()).run(&store).unwrap();

        let mut checked = 0;
        for held in result.portfolios.values() {
            for portfolio in held.values().filter(|p| !p.is_empty()) {
                assert_abs_diff_eq!(portfolio.total_weight(), 1.0, epsilon = 1e-9);
                checked += 1;
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_zscore_invariants_hold_across_run() {
        let store = market(None);
        let result = Backtest::new(config()).run(&store).unwrap();

        for date in result.normalized.dates() {
            for factor in result.normalized.factors() {
                let z: Vec<f64> = result.normalized.defined(date, factor).into_values().collect();
                if z.len() >= 2 {
                    assert_abs_diff_eq!(ronda_traits::stats::mean(&z).unwrap(), 0.0, epsilon = 1e-9);
                    assert_abs_diff_eq!(ronda_traits::stats::population_std(&z).unwrap(), 1.0, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let store = market(None);
        let backtest = Backtest::new(config());
        let first = backtest.run(&store).unwrap();
        let second = backtest.run(&store).unwrap();

        assert_eq!(first.returns, second.returns);
        assert_eq!(first.report, second.report);
        assert_eq!(first.factors, second.factors);
    }

    #[test]
    fn test_factors_unchanged_by_future_observations() {
        // Factor values at a date must be identical whether or not any later
        // observation exists.
        let full = market(None);
        let backtest = Backtest::new(config());
        let result = backtest.run(&full).unwrap();

        for date in [d(2022, 9, 30), d(2023, 3, 31), d(2023, 8, 31)] {
            let truncated = market(Some(date));
            let universes = backtest.universes(&truncated, &[date]);
            let panel = FactorComputer::from_config(&backtest.config().factors)
                .unwrap()
                .compute(&truncated, &universes)
                .unwrap();

            for factor in ["momentum", "value", "quality", "volatility"] {
                assert_eq!(
                    panel.cross_section(date, factor),
                    result.factors.cross_section(date, factor),
                    "{factor} at {date}"
                );
            }
        }
    }

    #[test]
    fn test_universe_filter_and_index_exclusion() {
        let store = market(None);
        let mut config = config();
        config.universe = Some(SYMBOLS.iter().map(ToString::to_string).collect());
        config.benchmark = BenchmarkMethod::Index {
            symbol: "AAA".to_string(),
        };
        let result = Backtest::new(config).run(&store).unwrap();

        assert!(result.universes.values().all(|u| !u.contains("AAA")));
        // GGG lists in July 2022, HHH delists after July 2023.
        assert!(!result.universes[&d(2022, 3, 31)].contains("GGG"));
        assert!(result.universes[&d(2022, 9, 30)].contains("GGG"));
        assert!(!result.universes[&d(2023, 10, 31)].contains("HHH"));
        assert_eq!(result.report.get(BENCHMARK).unwrap().n_periods, MONTHS - 1);
    }

    #[test]
    fn test_excess_and_correlations() {
        let store = market(None);
        let result = Backtest::new(config()).run(&store).unwrap();

        let excess = result.excess_returns(COMBINED).unwrap();
        assert_eq!(excess.len(), MONTHS - 1);
        let corr = result.factor_correlations();
        assert_eq!(corr.names(), &["momentum", "value", "quality", "volatility"]);
    }

    #[test]
    fn test_empty_store_is_fatal() {
        let store = TimeSeriesStore::builder().build();
        let err = Backtest::default().run(&store).unwrap_err();
        assert!(matches!(err, RondaError::NoUsableData(_)));
    }

    #[test]
    fn test_final_month_ending_on_trading_day() {
        let mut builder = TimeSeriesStore::builder();
        for (k, symbol) in ["AAA", "BBB", "CCC", "DDD", "EEE"].iter().enumerate() {
            let base = 10.0 * (k + 1) as f64;
            builder
                .price(symbol, d(2024, 9, 30), base)
                .unwrap()
                .price(symbol, d(2024, 10, 31), base * 1.02)
                .unwrap()
                .price(symbol, d(2024, 11, 29), base * 1.05)
                .unwrap();
        }
        let store = builder.build();

        let backtest = Backtest::default();
        assert_eq!(
            backtest.rebalance_dates(&store).unwrap(),
            vec![d(2024, 9, 30), d(2024, 10, 31), d(2024, 11, 30)]
        );

        // An explicit end bound before the month-end still applies.
        let config = BacktestConfig {
            end_date: Some(d(2024, 11, 29)),
            ..BacktestConfig::default()
        };
        assert_eq!(
            Backtest::new(config).rebalance_dates(&store).unwrap(),
            vec![d(2024, 9, 30), d(2024, 10, 31)]
        );
    }

    #[test]
    fn test_stale_final_month_not_extended() {
        let mut builder = TimeSeriesStore::builder();
        builder
            .price("AAA", d(2024, 9, 30), 10.0)
            .unwrap()
            .price("AAA", d(2024, 10, 31), 11.0)
            .unwrap()
            .price("AAA", d(2024, 11, 15), 12.0)
            .unwrap();

        let dates = Backtest::default().rebalance_dates(&builder.build()).unwrap();
        assert_eq!(dates, vec![d(2024, 9, 30), d(2024, 10, 31)]);
    }

    #[test]
    fn test_huge_liveness_tolerance_rejected() {
        let err = BacktestConfig::from_json_str(r#"{ "liveness_tolerance_days": 1000000000000000 }"#).unwrap_err();
        assert!(matches!(err, RondaError::InvalidConfig(_)));
        assert!(BacktestConfig::from_json_str(r#"{ "liveness_tolerance_days": 366 }"#).is_ok());
    }

    #[test]
    fn test_single_rebalance_date_is_fatal() {
        let mut builder = TimeSeriesStore::builder();
        builder.price("AAA", d(2024, 1, 31), 10.0).unwrap();
        let err = Backtest::default().run(&builder.build()).unwrap_err();
        assert!(matches!(err, RondaError::NoUsableData(_)));
    }
}
