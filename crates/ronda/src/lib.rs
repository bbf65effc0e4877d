#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Quick Start
//!
//! ```
//! use ronda::prelude::*;
//!
//! # fn main() -> ronda::Result<()> {
//! let mut builder = TimeSeriesStore::builder();
//! for (i, symbol) in ["AAA", "BBB", "CCC", "DDD", "EEE"].iter().enumerate() {
//!     let prices: Vec<f64> = (0..18)
//!         .map(|m| 50.0 * (1.0 + 0.01 * i as f64).powi(m) * (1.0 + 0.02 * f64::from(m).sin()))
//!         .collect();
//!     builder.monthly_prices(symbol, Date::from_ymd_opt(2023, 1, 31).unwrap(), &prices)?;
//! }
//! let store = builder.build();
//!
//! let mut config = BacktestConfig::default();
//! config.factors.enabled = vec!["momentum".to_string()];
//! config.factors.momentum.lookback_months = 3;
//!
//! let result = Backtest::new(config).run(&store)?;
//! assert!(result.report.get("combined").is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`data`] holds prices and fundamentals with point-in-time access
//! 2. [`signals`] computes raw factor values per rebalance date
//! 3. [`combine`] standardizes factors and builds composite scores
//! 4. [`eval`] forms portfolios, composes returns and reports metrics

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core types, errors, statistics and calendar helpers.
pub mod traits {
    pub use ronda_traits::*;
}

/// Time-series storage and point-in-time views.
pub mod data {
    pub use ronda_data::*;
}

/// Factor signals and the factor computer.
///
/// # Example
///
/// ```
/// use ronda::signals::registry::available_signals;
///
/// let names: Vec<&str> = available_signals().iter().map(|s| s.name).collect();
/// assert_eq!(names, vec!["momentum", "value", "quality", "volatility"]);
/// ```
pub mod signals {
    pub use ronda_signals::*;
}

/// Cross-sectional normalization and composite scoring.
pub mod combine {
    pub use ronda_combine::*;
}

/// Portfolios, returns, performance metrics and the backtest pipeline.
pub mod eval {
    pub use ronda_eval::*;
}

pub use ronda_traits::{Date, Result, RondaError, Symbol};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use ronda_combine::{CompositeConfig, CompositePolicy, CrossSectionalNormalizer};
    pub use ronda_data::{PointInTimeView, TimeSeriesStore};
    pub use ronda_eval::{
        Backtest, BacktestConfig, BacktestResult, BenchmarkMethod, MissingPricePolicy, PerformanceAnalyzer,
        PerformanceConfig, PortfolioConstructor, ReturnComposer,
    };
    pub use ronda_signals::{FactorComputer, FactorConfig, Signal};
    pub use ronda_traits::{Date, Field, Result, RondaError, Symbol};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_error_types() {
        let _result: Result<()> = Ok(());
        let error = RondaError::InvalidConfig("quantile".to_string());
        assert!(error.to_string().contains("quantile"));
    }
}
