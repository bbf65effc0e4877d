//! Earnings yield (E/P) value signal.

use ronda_data::PointInTimeView;
use ronda_traits::{Date, Field, Result, calendar};
use serde::{Deserialize, Serialize};

use crate::registry::SignalCategory;
use crate::signal::{Signal, ratio};

/// Default reporting lag for fundamental snapshots, in calendar months.
///
/// The cutoff is the month-end of the month this many months before the
/// rebalance month: a 2024-06-30 rebalance reads snapshots dated on or before
/// 2024-03-31.
pub const DEFAULT_FUNDAMENTAL_LAG_MONTHS: u32 = 3;

/// Configuration for the earnings yield signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarningsYieldConfig {
    /// Reporting lag in months (default: 3).
    pub lag_months: u32,
}

impl Default for EarningsYieldConfig {
    fn default() -> Self {
        Self {
            lag_months: DEFAULT_FUNDAMENTAL_LAG_MONTHS,
        }
    }
}

/// Earnings yield signal: trailing twelve month earnings over market cap.
///
/// Both inputs come from the latest snapshots readable at the lag cutoff.
/// Market cap is taken from the `market_cap` field when present, otherwise
/// derived as shares outstanding times the month-end price of the month the
/// share count was reported. Undefined when either input is missing or market
/// cap is not positive.
#[derive(Debug, Clone)]
pub struct EarningsYield {
    config: EarningsYieldConfig,
}

impl EarningsYield {
    /// Create a new earnings yield signal with the given configuration.
    #[must_use]
    pub const fn new(config: EarningsYieldConfig) -> Self {
        Self { config }
    }

    /// Reporting lag in months.
    #[must_use]
    pub const fn lag_months(&self) -> u32 {
        self.config.lag_months
    }
}

impl Default for EarningsYield {
    fn default() -> Self {
        Self::new(EarningsYieldConfig::default())
    }
}

/// Market capitalization readable through `view` as of `date`.
pub(crate) fn market_cap(view: &PointInTimeView<'_>, symbol: &str, date: Date) -> Result<Option<f64>> {
    if let Some((_, cap)) = view.fundamental_asof(symbol, Field::MarketCap, date)? {
        return Ok(Some(cap).filter(|c| *c > 0.0));
    }
    let Some((reported, shares)) = view.fundamental_asof(symbol, Field::SharesOutstanding, date)? else {
        return Ok(None);
    };
    let price = match view.month_end_price(symbol, reported) {
        Ok(price) => price,
        // Fundamentals without any price history cannot be capitalized.
        Err(ronda_traits::RondaError::DataGap(_)) => None,
        Err(e) => return Err(e),
    };
    Ok(price.map(|p| p * shares).filter(|c| *c > 0.0))
}

impl Signal for EarningsYield {
    fn name(&self) -> &str {
        "value"
    }

    fn category(&self) -> SignalCategory {
        SignalCategory::Value
    }

    fn lookback_months(&self) -> u32 {
        self.config.lag_months
    }

    fn required_fields(&self) -> &[Field] {
        &[Field::EarningsTtm, Field::MarketCap, Field::SharesOutstanding]
    }

    fn cutoff(&self, date: Date) -> Option<Date> {
        calendar::months_back(date, self.config.lag_months)
    }

    fn compute(&self, view: &PointInTimeView<'_>, symbol: &str, _date: Date) -> Result<Option<f64>> {
        let cutoff = view.cutoff();
        let Some((_, earnings)) = view.fundamental_asof(symbol, Field::EarningsTtm, cutoff)? else {
            return Ok(None);
        };
        let Some(cap) = market_cap(view, symbol, cutoff)? else {
            return Ok(None);
        };
        Ok(ratio(earnings, cap))
    }
}
