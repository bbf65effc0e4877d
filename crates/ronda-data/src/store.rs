//! Aligned per-instrument observation store.

use std::collections::{BTreeMap, BTreeSet};

use chrono::TimeDelta;
use ronda_traits::{Date, Field, Result, RondaError, Symbol, calendar};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::view::PointInTimeView;

/// Default trailing window, in calendar days, within which an instrument must
/// have a price observation to count as live.
pub const DEFAULT_LIVENESS_TOLERANCE_DAYS: i64 = 7;

/// An instrument and its lifecycle window in the loaded data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// First date with any observation.
    pub first_date: Date,
    /// Last date with any observation.
    pub last_date: Date,
}

#[derive(Debug, Clone, Default)]
struct InstrumentSeries {
    fields: BTreeMap<Field, BTreeMap<Date, f64>>,
}

impl InstrumentSeries {
    fn field(&self, field: Field) -> Option<&BTreeMap<Date, f64>> {
        self.fields.get(&field).filter(|obs| !obs.is_empty())
    }

    fn span(&self) -> Option<(Date, Date)> {
        let first = self.fields.values().filter_map(|obs| obs.keys().next()).min()?;
        let last = self.fields.values().filter_map(|obs| obs.keys().next_back()).max()?;
        Some((*first, *last))
    }
}

/// Immutable store of price and fundamental observations.
///
/// At most one observation exists per (instrument, date, field). Lookups for
/// known instruments return `Ok(None)` when a value is missing, since sparse
/// fundamentals are expected; only structurally impossible lookups (unknown
/// instrument, or a price query on an instrument without any price history)
/// fail with [`RondaError::DataGap`].
#[derive(Debug, Clone)]
pub struct TimeSeriesStore {
    series: BTreeMap<Symbol, InstrumentSeries>,
    liveness_tolerance_days: i64,
}

impl TimeSeriesStore {
    /// Start building a store.
    #[must_use]
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// Number of instruments.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the store holds no instruments.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Instrument symbols in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Liveness tolerance used by [`Self::universe`].
    #[must_use]
    pub const fn liveness_tolerance_days(&self) -> i64 {
        self.liveness_tolerance_days
    }

    /// Lifecycle window for one instrument.
    pub fn instrument(&self, symbol: &str) -> Option<Instrument> {
        let (first_date, last_date) = self.series.get(symbol)?.span()?;
        Some(Instrument {
            symbol: symbol.to_string(),
            first_date,
            last_date,
        })
    }

    /// Lifecycle windows for all instruments, ordered by symbol.
    pub fn instruments(&self) -> Vec<Instrument> {
        self.symbols().filter_map(|s| self.instrument(s)).collect()
    }

    /// Earliest and latest observation dates across the store.
    pub fn date_range(&self) -> Option<(Date, Date)> {
        let spans: Vec<(Date, Date)> = self.series.values().filter_map(InstrumentSeries::span).collect();
        let first = spans.iter().map(|s| s.0).min()?;
        let last = spans.iter().map(|s| s.1).max()?;
        Some((first, last))
    }

    fn series(&self, symbol: &str) -> Result<&InstrumentSeries> {
        self.series
            .get(symbol)
            .ok_or_else(|| RondaError::DataGap(format!("unknown instrument '{symbol}'")))
    }

    fn prices(&self, symbol: &str) -> Result<&BTreeMap<Date, f64>> {
        self.series(symbol)?
            .field(Field::Price)
            .ok_or_else(|| RondaError::DataGap(format!("'{symbol}' has no price history")))
    }

    /// Price observed exactly on `date`.
    pub fn price(&self, symbol: &str, date: Date) -> Result<Option<f64>> {
        Ok(self.prices(symbol)?.get(&date).copied())
    }

    /// Latest price observed on or before `date`.
    pub fn price_asof(&self, symbol: &str, date: Date) -> Result<Option<(Date, f64)>> {
        Ok(self
            .prices(symbol)?
            .range(..=date)
            .next_back()
            .map(|(d, v)| (*d, *v)))
    }

    /// Month-granularity price sample: the last price observed in the
    /// calendar month of `date`, on or before `date`.
    pub fn month_end_price(&self, symbol: &str, date: Date) -> Result<Option<f64>> {
        let start = calendar::month_start(date);
        Ok(self
            .prices(symbol)?
            .range(start..=date)
            .next_back()
            .map(|(_, v)| *v))
    }

    /// Observation of `field` dated exactly `date`.
    pub fn fundamental(&self, symbol: &str, field: Field, date: Date) -> Result<Option<f64>> {
        Ok(self
            .series(symbol)?
            .field(field)
            .and_then(|obs| obs.get(&date))
            .copied())
    }

    /// Latest observation of `field` dated on or before `date`.
    pub fn fundamental_asof(
        &self,
        symbol: &str,
        field: Field,
        date: Date,
    ) -> Result<Option<(Date, f64)>> {
        Ok(self
            .series(symbol)?
            .field(field)
            .and_then(|obs| obs.range(..=date).next_back())
            .map(|(d, v)| (*d, *v)))
    }

    /// Instruments with a price observed within the liveness tolerance on or
    /// before `date`.
    pub fn universe(&self, date: Date) -> BTreeSet<Symbol> {
        self.universe_within(date, self.liveness_tolerance_days)
    }

    /// Instruments with a price observed within `tolerance_days` calendar days
    /// on or before `date`. Tolerances reaching past chrono's date range
    /// accept any earlier price.
    pub fn universe_within(&self, date: Date, tolerance_days: i64) -> BTreeSet<Symbol> {
        let earliest = TimeDelta::try_days(tolerance_days.max(0))
            .and_then(|span| date.checked_sub_signed(span))
            .unwrap_or(Date::MIN);
        self.series
            .iter()
            .filter(|(_, s)| {
                s.field(Field::Price)
                    .is_some_and(|p| p.range(earliest..=date).next_back().is_some())
            })
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// A read-only view that hides every observation dated after `cutoff`.
    #[must_use]
    pub const fn as_of(&self, cutoff: Date) -> PointInTimeView<'_> {
        PointInTimeView::new(self, cutoff)
    }
}

/// Incremental builder for a [`TimeSeriesStore`].
#[derive(Debug)]
pub struct StoreBuilder {
    series: BTreeMap<Symbol, InstrumentSeries>,
    liveness_tolerance_days: i64,
    skipped: usize,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self {
            series: BTreeMap::new(),
            liveness_tolerance_days: DEFAULT_LIVENESS_TOLERANCE_DAYS,
            skipped: 0,
        }
    }
}

impl StoreBuilder {
    /// Override the liveness tolerance in calendar days.
    #[must_use]
    pub fn liveness_tolerance_days(mut self, days: i64) -> Self {
        self.liveness_tolerance_days = days;
        self
    }

    /// Record one observation.
    ///
    /// Non-finite values are treated as missing and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidData`] if an observation already exists
    /// for the same (symbol, date, field).
    pub fn observe(&mut self, symbol: &str, date: Date, field: Field, value: f64) -> Result<&mut Self> {
        if !value.is_finite() {
            self.skipped += 1;
            return Ok(self);
        }
        let obs = self
            .series
            .entry(symbol.to_string())
            .or_default()
            .fields
            .entry(field)
            .or_default();
        if obs.insert(date, value).is_some() {
            return Err(RondaError::InvalidData(format!(
                "duplicate {field} observation for {symbol} on {date}"
            )));
        }
        Ok(self)
    }

    /// Record a price observation.
    pub fn price(&mut self, symbol: &str, date: Date, value: f64) -> Result<&mut Self> {
        self.observe(symbol, date, Field::Price, value)
    }

    /// Record a run of prices on consecutive month-ends starting at the month
    /// of `first`.
    pub fn monthly_prices(&mut self, symbol: &str, first: Date, prices: &[f64]) -> Result<&mut Self> {
        let start = calendar::month_start(first);
        for (i, &value) in prices.iter().enumerate() {
            let month = start
                .checked_add_months(chrono::Months::new(i as u32))
                .ok_or_else(|| RondaError::InvalidDate(format!("{first} + {i} months")))?;
            self.price(symbol, calendar::month_end(month), value)?;
        }
        Ok(self)
    }

    /// Record a fundamental observation.
    pub fn fundamental(&mut self, symbol: &str, field: Field, date: Date, value: f64) -> Result<&mut Self> {
        self.observe(symbol, date, field, value)
    }

    /// Number of observations skipped as non-finite.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Finish building.
    pub fn build(self) -> TimeSeriesStore {
        if self.skipped > 0 {
            warn!(skipped = self.skipped, "skipped non-finite observations");
        }
        let priced = self
            .series
            .values()
            .filter(|s| s.field(Field::Price).is_some())
            .count();
        debug!(
            instruments = self.series.len(),
            priced,
            "built time series store"
        );
        TimeSeriesStore {
            series: self.series,
            liveness_tolerance_days: self.liveness_tolerance_days,
        }
    }
}
