//! Holding-period return composition.
//!
//! A portfolio selected at rebalance date `d_i` is held unchanged until
//! `d_{i+1}`. Its period return is the weighted sum of the instruments' simple
//! price returns between the two month-granularity price samples.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use ronda_data::TimeSeriesStore;
use ronda_traits::{Date, Field, Result, RondaError, Symbol};
use serde::{Deserialize, Serialize};

use crate::portfolio::Portfolio;

/// Treatment of held instruments whose period return is undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPricePolicy {
    /// Keep nominal weights and add only the defined contributions, as if
    /// the missing holdings returned zero.
    #[default]
    ZeroContribution,

    /// Rescale the weights of the instruments with a defined return to sum
    /// to one.
    Renormalize,
}

/// How the benchmark series is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkMethod {
    /// Equal-weighted return of the live universe.
    #[default]
    EqualWeight,

    /// Market-cap-weighted return of the live universe.
    CapWeight,

    /// Price return of one instrument in the store, e.g. an index proxy.
    Index {
        /// Symbol of the index instrument.
        symbol: Symbol,
    },
}

/// Return of one holding period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    /// Rebalance date the period starts at.
    pub start: Date,
    /// Next rebalance date, where the period ends.
    pub end: Date,
    /// Simple return, `None` when undefined.
    pub value: Option<f64>,
}

/// Chronological period returns of one named strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    /// Strategy name.
    pub name: String,
    /// Period returns, oldest first.
    pub points: Vec<PeriodReturn>,
}

impl ReturnSeries {
    /// Create a series.
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<PeriodReturn>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Number of periods, defined or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Defined returns in order, undefined periods dropped.
    #[must_use]
    pub fn defined(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value).collect()
    }

    /// Period returns keyed by period end.
    #[must_use]
    pub fn by_end(&self) -> BTreeMap<Date, Option<f64>> {
        self.points.iter().map(|p| (p.end, p.value)).collect()
    }

    /// Period-by-period difference `self - other`, aligned on period end.
    ///
    /// A period is undefined unless both sides are defined.
    #[must_use]
    pub fn excess_over(&self, other: &Self) -> Self {
        let other = other.by_end();
        let points = self
            .points
            .iter()
            .map(|p| PeriodReturn {
                value: match (p.value, other.get(&p.end).copied().flatten()) {
                    (Some(a), Some(b)) => Some(a - b),
                    _ => None,
                },
                ..*p
            })
            .collect();
        Self::new(format!("{}_excess", self.name), points)
    }

    /// Frame with columns `start`, `end`, `return`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let starts: Vec<String> = self.points.iter().map(|p| p.start.to_string()).collect();
        let ends: Vec<String> = self.points.iter().map(|p| p.end.to_string()).collect();
        let values: Vec<Option<f64>> = self.points.iter().map(|p| p.value).collect();

        Ok(df! {
            "start" => starts,
            "end" => ends,
            "return" => values,
        }?)
    }
}

/// Wide frame of several series: `start`, `end`, then one column per
/// strategy. Series are aligned on period end.
pub fn returns_frame(series: &[ReturnSeries]) -> Result<DataFrame> {
    let periods: BTreeMap<Date, Date> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| (p.end, p.start)))
        .collect();

    let mut columns = vec![
        Column::new(
            "start".into(),
            periods.values().map(ToString::to_string).collect::<Vec<_>>(),
        ),
        Column::new(
            "end".into(),
            periods.keys().map(ToString::to_string).collect::<Vec<_>>(),
        ),
    ];
    for s in series {
        let by_end = s.by_end();
        let values: Vec<Option<f64>> = periods
            .keys()
            .map(|end| by_end.get(end).copied().flatten())
            .collect();
        columns.push(Column::new(s.name.as_str().into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

/// Converts held portfolios and instrument prices into period returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnComposer {
    policy: MissingPricePolicy,
}

impl ReturnComposer {
    /// Create a composer with the given missing-price policy.
    #[must_use]
    pub const fn new(policy: MissingPricePolicy) -> Self {
        Self { policy }
    }

    /// Missing-price policy in use.
    #[must_use]
    pub const fn policy(&self) -> MissingPricePolicy {
        self.policy
    }

    /// Simple price return of `symbol` from the `start` price sample to the
    /// `end` price sample.
    ///
    /// Undefined if either sample is missing, the start price is not positive,
    /// or the instrument has no price history at all.
    #[must_use]
    pub fn instrument_return(&self, store: &TimeSeriesStore, symbol: &str, start: Date, end: Date) -> Option<f64> {
        let p0 = store.month_end_price(symbol, start).ok().flatten()?;
        let p1 = store.month_end_price(symbol, end).ok().flatten()?;
        if p0 <= 0.0 {
            return None;
        }
        Some(p1 / p0 - 1.0).filter(|r| r.is_finite())
    }

    /// Weighted return of `weights` over one period, applying the
    /// missing-price policy.
    ///
    /// Undefined when no holding has a defined return.
    #[must_use]
    pub fn weighted_return(
        &self,
        store: &TimeSeriesStore,
        weights: &BTreeMap<Symbol, f64>,
        start: Date,
        end: Date,
    ) -> Option<f64> {
        let mut contribution = 0.0;
        let mut covered = 0.0;
        let mut any = false;
        for (symbol, weight) in weights {
            if let Some(r) = self.instrument_return(store, symbol, start, end) {
                contribution += weight * r;
                covered += weight;
                any = true;
            }
        }

        match self.policy {
            _ if !any => None,
            MissingPricePolicy::ZeroContribution => Some(contribution),
            MissingPricePolicy::Renormalize if covered > 0.0 => Some(contribution / covered),
            MissingPricePolicy::Renormalize => None,
        }
    }

    /// Period returns of a strategy rebalanced at `dates`.
    ///
    /// The portfolio selected at `dates[i]` earns the period ending at
    /// `dates[i + 1]`. A missing or empty portfolio gives an undefined period.
    #[must_use]
    pub fn compose(
        &self,
        name: &str,
        store: &TimeSeriesStore,
        dates: &[Date],
        portfolios: &BTreeMap<Date, Portfolio>,
    ) -> ReturnSeries {
        let points = dates
            .windows(2)
            .map(|w| PeriodReturn {
                start: w[0],
                end: w[1],
                value: portfolios
                    .get(&w[0])
                    .filter(|p| !p.is_empty())
                    .and_then(|p| self.weighted_return(store, &p.holdings, w[0], w[1])),
            })
            .collect();
        ReturnSeries::new(name, points)
    }

    /// Benchmark period returns over `dates`.
    ///
    /// Universe benchmarks always renormalize over instruments with a defined
    /// return, whatever the strategy policy is.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidConfig`] if an index benchmark names an
    /// instrument absent from the store.
    pub fn benchmark(
        &self,
        name: &str,
        store: &TimeSeriesStore,
        dates: &[Date],
        universes: &BTreeMap<Date, BTreeSet<Symbol>>,
        method: &BenchmarkMethod,
    ) -> Result<ReturnSeries> {
        if let BenchmarkMethod::Index { symbol } = method
            && store.instrument(symbol).is_none()
        {
            return Err(RondaError::InvalidConfig(format!(
                "benchmark index '{symbol}' not in data"
            )));
        }

        let renormalizing = Self::new(MissingPricePolicy::Renormalize);
        let points = dates
            .windows(2)
            .map(|w| {
                let (start, end) = (w[0], w[1]);
                let universe = universes.get(&start);
                let value = match method {
                    BenchmarkMethod::Index { symbol } => self.instrument_return(store, symbol, start, end),
                    BenchmarkMethod::EqualWeight => universe.and_then(|u| {
                        let weights = u.iter().map(|s| (s.clone(), 1.0)).collect();
                        renormalizing.weighted_return(store, &weights, start, end)
                    }),
                    BenchmarkMethod::CapWeight => universe.and_then(|u| {
                        let weights = u
                            .iter()
                            .filter_map(|s| market_cap(store, s, start).map(|c| (s.clone(), c)))
                            .collect();
                        renormalizing.weighted_return(store, &weights, start, end)
                    }),
                };
                PeriodReturn { start, end, value }
            })
            .collect();
        Ok(ReturnSeries::new(name, points))
    }
}

/// Market cap known at `date`: the latest `market_cap` observation, else the
/// latest share count times the month-granularity price at `date`.
fn market_cap(store: &TimeSeriesStore, symbol: &str, date: Date) -> Option<f64> {
    let cap = match store.fundamental_asof(symbol, Field::MarketCap, date).ok()? {
        Some((_, cap)) => Some(cap),
        None => {
            let (_, shares) = store.fundamental_asof(symbol, Field::SharesOutstanding, date).ok()??;
            store.month_end_price(symbol, date).ok()?.map(|p| p * shares)
        }
    };
    cap.filter(|c| c.is_finite() && *c > 0.0)
}
