//! Point-in-time view over a [`TimeSeriesStore`].
//!
//! Signals never read the store directly. They receive a view bounded at the
//! lag cutoff of the rebalance date being scored, so no observation dated
//! after the cutoff can reach a factor value.

use ronda_traits::{Date, Field, Result};

use crate::store::TimeSeriesStore;

/// Read-only store access limited to observations dated on or before `cutoff`.
#[derive(Debug, Clone, Copy)]
pub struct PointInTimeView<'a> {
    store: &'a TimeSeriesStore,
    cutoff: Date,
}

impl<'a> PointInTimeView<'a> {
    pub(crate) const fn new(store: &'a TimeSeriesStore, cutoff: Date) -> Self {
        Self { store, cutoff }
    }

    /// Latest readable date.
    #[must_use]
    pub const fn cutoff(&self) -> Date {
        self.cutoff
    }

    fn clamp(&self, date: Date) -> Date {
        date.min(self.cutoff)
    }

    /// Month-granularity price sample for the month of `date`, restricted to
    /// observations on or before the cutoff.
    pub fn month_end_price(&self, symbol: &str, date: Date) -> Result<Option<f64>> {
        if ronda_traits::calendar::month_start(date) > self.cutoff {
            // Still surfaces unknown instruments as data gaps.
            self.store.price_asof(symbol, self.cutoff)?;
            return Ok(None);
        }
        self.store.month_end_price(symbol, self.clamp(date))
    }

    /// Latest price on or before `date` and the cutoff.
    pub fn price_asof(&self, symbol: &str, date: Date) -> Result<Option<(Date, f64)>> {
        self.store.price_asof(symbol, self.clamp(date))
    }

    /// Latest observation of `field` on or before `date` and the cutoff.
    pub fn fundamental_asof(
        &self,
        symbol: &str,
        field: Field,
        date: Date,
    ) -> Result<Option<(Date, f64)>> {
        self.store.fundamental_asof(symbol, field, self.clamp(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_traits::RondaError;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    const POISON: f64 = 1.0e12;

    fn poisoned_store() -> TimeSeriesStore {
        let mut builder = TimeSeriesStore::builder();
        builder
            .price("AAA", d(2024, 1, 31), 100.0)
            .unwrap()
            .price("AAA", d(2024, 2, 15), 105.0)
            .unwrap()
            .price("AAA", d(2024, 2, 29), POISON)
            .unwrap()
            .price("AAA", d(2024, 3, 29), POISON)
            .unwrap()
            .fundamental("AAA", Field::EarningsTtm, d(2023, 12, 31), 4.0)
            .unwrap()
            .fundamental("AAA", Field::EarningsTtm, d(2024, 3, 31), POISON)
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_view_hides_post_cutoff_prices() {
        let store = poisoned_store();
        let view = store.as_of(d(2024, 2, 20));

        assert_eq!(view.cutoff(), d(2024, 2, 20));
        assert_eq!(view.month_end_price("AAA", d(2024, 1, 31)).unwrap(), Some(100.0));
        // The February month-end print is after the cutoff; the mid-month
        // print is the latest readable sample.
        assert_eq!(view.month_end_price("AAA", d(2024, 2, 29)).unwrap(), Some(105.0));
        assert_eq!(view.month_end_price("AAA", d(2024, 3, 31)).unwrap(), None);
        assert_eq!(
            view.price_asof("AAA", d(2024, 12, 31)).unwrap(),
            Some((d(2024, 2, 15), 105.0))
        );
    }

    #[test]
    fn test_view_hides_post_cutoff_fundamentals() {
        let store = poisoned_store();
        let view = store.as_of(d(2024, 3, 30));
        let (date, value) = view
            .fundamental_asof("AAA", Field::EarningsTtm, d(2024, 6, 30))
            .unwrap()
            .unwrap();
        assert_eq!(date, d(2023, 12, 31));
        assert!(value < POISON);
    }

    #[test]
    fn test_view_reports_data_gaps() {
        let store = poisoned_store();
        let view = store.as_of(d(2024, 1, 1));
        assert!(matches!(
            view.month_end_price("ZZZ", d(2024, 6, 30)),
            Err(RondaError::DataGap(_))
        ));
    }
}
