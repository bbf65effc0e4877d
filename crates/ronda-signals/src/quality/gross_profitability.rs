//! Gross profitability quality signal.

use ronda_data::PointInTimeView;
use ronda_traits::{Date, Field, Result, calendar};
use serde::{Deserialize, Serialize};

use crate::registry::SignalCategory;
use crate::signal::{Signal, ratio};
use crate::value::DEFAULT_FUNDAMENTAL_LAG_MONTHS;

/// Configuration for the gross profitability signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrossProfitabilityConfig {
    /// Reporting lag in months (default: 3).
    pub lag_months: u32,
}

impl Default for GrossProfitabilityConfig {
    fn default() -> Self {
        Self {
            lag_months: DEFAULT_FUNDAMENTAL_LAG_MONTHS,
        }
    }
}

/// Gross profitability: gross profit over total assets.
///
/// Each field is resolved independently to its latest snapshot at the lag
/// cutoff. Undefined when either is missing or total assets are not positive.
#[derive(Debug, Clone)]
pub struct GrossProfitability {
    config: GrossProfitabilityConfig,
}

impl GrossProfitability {
    /// Create a new gross profitability signal with the given configuration.
    #[must_use]
    pub const fn new(config: GrossProfitabilityConfig) -> Self {
        Self { config }
    }
}

impl Default for GrossProfitability {
    fn default() -> Self {
        Self::new(GrossProfitabilityConfig::default())
    }
}

impl Signal for GrossProfitability {
    fn name(&self) -> &str {
        "quality"
    }

    fn category(&self) -> SignalCategory {
        SignalCategory::Quality
    }

    fn lookback_months(&self) -> u32 {
        self.config.lag_months
    }

    fn required_fields(&self) -> &[Field] {
        &[Field::GrossProfit, Field::TotalAssets]
    }

    fn cutoff(&self, date: Date) -> Option<Date> {
        calendar::months_back(date, self.config.lag_months)
    }

    fn compute(&self, view: &PointInTimeView<'_>, symbol: &str, _date: Date) -> Result<Option<f64>> {
        let cutoff = view.cutoff();
        let profit = view.fundamental_asof(symbol, Field::GrossProfit, cutoff)?;
        let assets = view.fundamental_asof(symbol, Field::TotalAssets, cutoff)?;

        Ok(match (profit, assets) {
            (Some((_, profit)), Some((_, assets))) if assets > 0.0 => ratio(profit, assets),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_data::TimeSeriesStore;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn compute(store: &TimeSeriesStore, date: Date) -> Option<f64> {
        let signal = GrossProfitability::default();
        let view = store.as_of(signal.cutoff(date).unwrap());
        signal.compute(&view, "AAA", date).unwrap()
    }

    #[test]
    fn test_fields_resolved_independently() {
        let mut builder = TimeSeriesStore::builder();
        builder
            .fundamental("AAA", Field::GrossProfit, d(2023, 12, 31), 30.0)
            .unwrap()
            .fundamental("AAA", Field::TotalAssets, d(2023, 9, 30), 100.0)
            .unwrap()
            .fundamental("AAA", Field::TotalAssets, d(2024, 3, 31), 120.0)
            .unwrap();
        let store = builder.build();

        // Cutoff 2024-01-31: latest assets is the September snapshot.
        assert_relative_eq!(compute(&store, d(2024, 4, 30)).unwrap(), 0.3, epsilon = 1e-12);
        // Cutoff 2024-03-31 picks up the newer assets figure.
        assert_relative_eq!(compute(&store, d(2024, 6, 30)).unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_assets_undefined() {
        let mut builder = TimeSeriesStore::builder();
        builder
            .fundamental("AAA", Field::GrossProfit, d(2023, 12, 31), 30.0)
            .unwrap()
            .fundamental("AAA", Field::TotalAssets, d(2023, 12, 31), 0.0)
            .unwrap();
        let store = builder.build();

        assert_eq!(compute(&store, d(2024, 6, 30)), None);
    }

    #[test]
    fn test_missing_profit_undefined() {
        let mut builder = TimeSeriesStore::builder();
        builder
            .fundamental("AAA", Field::TotalAssets, d(2023, 12, 31), 50.0)
            .unwrap();
        let store = builder.build();

        assert_eq!(compute(&store, d(2024, 6, 30)), None);
    }
}
