//! Trailing volatility of monthly returns.

use ronda_data::PointInTimeView;
use ronda_traits::{Date, Field, Result, calendar, stats};
use serde::{Deserialize, Serialize};

use crate::registry::SignalCategory;
use crate::signal::{Signal, ratio};

/// Configuration for the trailing volatility signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityConfig {
    /// Number of monthly returns in the window (default: 12).
    pub window_months: u32,

    /// Most recent months excluded from the window (default: 0).
    pub skip_months: u32,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            window_months: 12,
            skip_months: 0,
        }
    }
}

/// Sample standard deviation of monthly returns over a trailing window.
///
/// Month-end prices are sampled at `t - skip - k` for `k = 0..=window`, which
/// yields up to `window` consecutive monthly returns. Returns whose endpoints
/// are missing are dropped. At least two defined returns are needed.
#[derive(Debug, Clone)]
pub struct TrailingVolatility {
    config: VolatilityConfig,
}

impl TrailingVolatility {
    /// Create a new volatility signal with the given configuration.
    #[must_use]
    pub const fn new(config: VolatilityConfig) -> Self {
        Self { config }
    }

    /// Number of monthly returns in the window.
    #[must_use]
    pub const fn window_months(&self) -> u32 {
        self.config.window_months
    }
}

impl Default for TrailingVolatility {
    fn default() -> Self {
        Self::new(VolatilityConfig::default())
    }
}

impl Signal for TrailingVolatility {
    fn name(&self) -> &str {
        "volatility"
    }

    fn category(&self) -> SignalCategory {
        SignalCategory::Volatility
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn lookback_months(&self) -> u32 {
        self.config.window_months + self.config.skip_months
    }

    fn required_fields(&self) -> &[Field] {
        &[Field::Price]
    }

    fn cutoff(&self, date: Date) -> Option<Date> {
        calendar::months_back(date, self.config.skip_months)
    }

    fn compute(&self, view: &PointInTimeView<'_>, symbol: &str, date: Date) -> Result<Option<f64>> {
        // Oldest first.
        let mut prices = Vec::with_capacity(self.config.window_months as usize + 1);
        for k in (0..=self.config.window_months).rev() {
            let price = match calendar::months_back(date, self.config.skip_months + k) {
                Some(month) => view.month_end_price(symbol, month)?,
                None => None,
            };
            prices.push(price);
        }

        let returns: Vec<f64> = prices
            .windows(2)
            .filter_map(|pair| match (pair[0], pair[1]) {
                (Some(prev), Some(next)) if prev > 0.0 => ratio(next, prev).map(|r| r - 1.0),
                _ => None,
            })
            .collect();

        if returns.len() < 2 {
            return Ok(None);
        }
        Ok(stats::sample_std(&returns))
    }
}
