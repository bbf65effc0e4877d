//! Point-in-time factor signals.
//!
//! This crate computes the raw factor values of the backtest:
//! - Momentum: lookback price return skipping the most recent month
//! - Value: earnings yield from lagged fundamentals
//! - Quality: gross profitability from lagged fundamentals
//! - Volatility: trailing sample std of monthly returns (low preferred)
//!
//! Raw values are not standardized here. Undefined values stay `None` and are
//! excluded later by the normalizer.
//!
//! # Example
//!
//! ```
//! use ronda_data::TimeSeriesStore;
//! use ronda_signals::{FactorComputer, FactorConfig};
//! use ronda_traits::Date;
//!
//! let date = |y, m, d| Date::from_ymd_opt(y, m, d).unwrap();
//! let mut builder = TimeSeriesStore::builder();
//! builder.monthly_prices("AAA", date(2024, 1, 1), &[100.0, 110.0, 120.0, 90.0]).unwrap();
//! let store = builder.build();
//!
//! let mut config = FactorConfig::default();
//! config.enabled = vec!["momentum".to_string()];
//! config.momentum.lookback_months = 2;
//!
//! let rebalance = date(2024, 4, 30);
//! let universes = [(rebalance, store.universe(rebalance))].into_iter().collect();
//! let panel = FactorComputer::from_config(&config).unwrap().compute(&store, &universes).unwrap();
//! assert!((panel.raw_value(rebalance, "momentum", "AAA").unwrap() - 0.2).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod computer;
mod config;
mod signal;

pub mod momentum;
pub mod quality;
pub mod registry;
pub mod value;
pub mod volatility;

pub use computer::{CrossSection, FactorComputer, FactorMeta, FactorPanel, FactorSignal};
pub use config::FactorConfig;
pub use registry::{SignalCategory, SignalInfo, available_signals, create_signal};
pub use signal::Signal;
