//! Portfolio construction, return composition and performance evaluation.
//!
//! This crate turns scored cross-sections into strategy results:
//! - [`PortfolioConstructor`]: top-quantile, equal-weight long-only holdings
//! - [`ReturnComposer`]: holding-period returns of portfolios and benchmarks
//! - [`PerformanceAnalyzer`]: total, annualized and risk-adjusted metrics
//! - [`Backtest`]: the end-to-end pipeline over a [`ronda_data::TimeSeriesStore`]
//!
//! # Example
//!
//! ```
//! use ronda_eval::{PerformanceAnalyzer, PerformanceConfig};
//!
//! let analyzer = PerformanceAnalyzer::new(PerformanceConfig::default());
//! let metrics = analyzer.metrics("momentum", &[0.05, -0.10, 0.08, -0.20, 0.15]);
//!
//! assert_eq!(metrics.n_periods, 5);
//! assert!(metrics.max_drawdown.unwrap() < 0.0);
//! ```

pub mod backtest;
pub mod metrics;
pub mod portfolio;
pub mod returns;

pub use backtest::{
    BENCHMARK, Backtest, BacktestConfig, BacktestResult, COMBINED, MAX_LIVENESS_TOLERANCE_DAYS, RebalanceFrequency,
};
pub use metrics::{
    CorrelationMatrix, PerformanceAnalyzer, PerformanceConfig, PerformanceMetrics, PerformanceReport,
    cumulative_wealth, max_drawdown,
};
pub use portfolio::{DEFAULT_QUANTILE, Portfolio, PortfolioConstructor, selection_count};
pub use returns::{BenchmarkMethod, MissingPricePolicy, PeriodReturn, ReturnComposer, ReturnSeries, returns_frame};
