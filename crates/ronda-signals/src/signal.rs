//! Signal trait for point-in-time factor values.
//!
//! A signal turns the observations readable at a rebalance date into one raw
//! value per instrument. Signals are handed a [`PointInTimeView`] bounded at
//! their own lag cutoff, so the no-look-ahead property holds by construction
//! rather than by convention inside each implementation.

use std::fmt;

use ronda_data::PointInTimeView;
use ronda_traits::{Date, Field, Result};

use crate::registry::SignalCategory;

/// A factor that scores one instrument at one rebalance date.
///
/// # Example
///
/// ```
/// use ronda_data::PointInTimeView;
/// use ronda_signals::{Signal, SignalCategory};
/// use ronda_traits::{Date, Field, Result};
///
/// #[derive(Debug)]
/// struct LastPrice;
///
/// impl Signal for LastPrice {
///     fn name(&self) -> &str {
///         "last_price"
///     }
///
///     fn category(&self) -> SignalCategory {
///         SignalCategory::Momentum
///     }
///
///     fn lookback_months(&self) -> u32 {
///         0
///     }
///
///     fn required_fields(&self) -> &[Field] {
///         &[Field::Price]
///     }
///
///     fn cutoff(&self, date: Date) -> Option<Date> {
///         Some(date)
///     }
///
///     fn compute(&self, view: &PointInTimeView<'_>, symbol: &str, date: Date) -> Result<Option<f64>> {
///         view.month_end_price(symbol, date)
///     }
/// }
/// ```
pub trait Signal: Send + Sync + fmt::Debug {
    /// Unique name, used as the strategy name of the single-factor portfolio.
    fn name(&self) -> &str;

    /// Category classification.
    fn category(&self) -> SignalCategory;

    /// Whether a larger raw value ranks an instrument higher.
    fn higher_is_better(&self) -> bool {
        true
    }

    /// Months of history needed before the signal can be defined.
    fn lookback_months(&self) -> u32;

    /// Observation fields read by the signal.
    fn required_fields(&self) -> &[Field];

    /// Latest observation date the signal may read when scoring `date`.
    ///
    /// `None` means no cutoff is representable and the value is undefined.
    fn cutoff(&self, date: Date) -> Option<Date>;

    /// Raw value for `symbol` at rebalance `date`.
    ///
    /// Returns `Ok(None)` when inputs are missing or history is too short.
    /// Errors are reserved for structural gaps such as an unknown instrument.
    fn compute(&self, view: &PointInTimeView<'_>, symbol: &str, date: Date) -> Result<Option<f64>>;
}

/// Divide two values, undefined unless the result is finite.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestSignal;

    impl Signal for TestSignal {
        fn name(&self) -> &str {
            "test"
        }

        fn category(&self) -> SignalCategory {
            SignalCategory::Quality
        }

        fn lookback_months(&self) -> u32 {
            0
        }

        fn required_fields(&self) -> &[Field] {
            &[Field::TotalAssets]
        }

        fn cutoff(&self, date: Date) -> Option<Date> {
            Some(date)
        }

        fn compute(&self, _view: &PointInTimeView<'_>, _symbol: &str, _date: Date) -> Result<Option<f64>> {
            Ok(Some(1.0))
        }
    }

    #[test]
    fn test_default_orientation() {
        assert!(TestSignal.higher_is_better());
    }

    #[test]
    fn test_signal_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn Signal>>();
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(1.0, 4.0), Some(0.25));
        assert_eq!(ratio(1.0, 0.0), None);
        assert_eq!(ratio(f64::MAX, 1e-300), None);
    }
}
