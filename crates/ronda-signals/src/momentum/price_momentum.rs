//! Lookback momentum with a recent-month exclusion.

use ronda_data::PointInTimeView;
use ronda_traits::{Date, Field, Result, calendar};
use serde::{Deserialize, Serialize};

use crate::registry::SignalCategory;
use crate::signal::{Signal, ratio};

/// Configuration for the momentum signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Number of months the return spans (default: 12).
    pub lookback_months: u32,

    /// Number of most recent months to exclude (default: 1).
    pub skip_months: u32,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lookback_months: 12,
            skip_months: 1,
        }
    }
}

/// Price momentum signal.
///
/// For rebalance date `t` the raw value is
/// `price(t - skip) / price(t - skip - lookback) - 1`, where `price(m)` is
/// the month-granularity price sample of month `m`. Undefined if either
/// endpoint is missing.
///
/// # Example
///
/// ```
/// use ronda_signals::momentum::{MomentumConfig, PriceMomentum};
/// use ronda_signals::Signal;
///
/// // Default: 12-month momentum skipping the last month
/// let signal = PriceMomentum::default();
/// assert_eq!(signal.lookback_months(), 13);
/// ```
#[derive(Debug, Clone)]
pub struct PriceMomentum {
    config: MomentumConfig,
}

impl PriceMomentum {
    /// Create a new momentum signal with the given configuration.
    #[must_use]
    pub const fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Months spanned by the return.
    #[must_use]
    pub const fn span_months(&self) -> u32 {
        self.config.lookback_months
    }

    /// Most recent months excluded.
    #[must_use]
    pub const fn skip_months(&self) -> u32 {
        self.config.skip_months
    }
}

impl Default for PriceMomentum {
    fn default() -> Self {
        Self::new(MomentumConfig::default())
    }
}

impl Signal for PriceMomentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn category(&self) -> SignalCategory {
        SignalCategory::Momentum
    }

    fn lookback_months(&self) -> u32 {
        self.config.lookback_months + self.config.skip_months
    }

    fn required_fields(&self) -> &[Field] {
        &[Field::Price]
    }

    fn cutoff(&self, date: Date) -> Option<Date> {
        calendar::months_back(date, self.config.skip_months)
    }

    fn compute(&self, view: &PointInTimeView<'_>, symbol: &str, date: Date) -> Result<Option<f64>> {
        let (Some(end_month), Some(start_month)) = (
            calendar::months_back(date, self.config.skip_months),
            calendar::months_back(date, self.lookback_months()),
        ) else {
            return Ok(None);
        };

        let end = view.month_end_price(symbol, end_month)?;
        let start = view.month_end_price(symbol, start_month)?;

        Ok(match (end, start) {
            (Some(end), Some(start)) if start > 0.0 => ratio(end, start).map(|r| r - 1.0),
            _ => None,
        })
    }
}
