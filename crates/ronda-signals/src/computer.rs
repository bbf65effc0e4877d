//! Per-date factor computation over a live universe.
//!
//! Each rebalance date is scored independently, so dates are spread across
//! the rayon pool and merged back by key afterwards. The merged panel is
//! identical to what a sequential pass would produce.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use rayon::prelude::*;
use ronda_data::TimeSeriesStore;
use ronda_traits::{Date, Result, Symbol};
use tracing::{debug, warn};

use crate::config::FactorConfig;
use crate::registry::create_signal;
use crate::signal::Signal;

/// One raw factor value: `(instrument, rebalance date, factor, raw value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorSignal {
    /// Instrument identifier.
    pub symbol: Symbol,
    /// Rebalance date.
    pub date: Date,
    /// Factor name.
    pub factor: String,
    /// Raw value, `None` when undefined.
    pub raw_value: Option<f64>,
}

/// Name and orientation of a computed factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorMeta {
    /// Factor name.
    pub name: String,
    /// Whether larger raw values rank higher.
    pub higher_is_better: bool,
}

/// Raw values for one factor at one date, keyed by instrument.
pub type CrossSection = BTreeMap<Symbol, Option<f64>>;

type DateSlice = BTreeMap<String, CrossSection>;

/// Raw factor values indexed by date, factor and instrument.
///
/// Every instrument of a date's universe has an entry for every factor, even
/// when the value is undefined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorPanel {
    factors: Vec<FactorMeta>,
    values: BTreeMap<Date, DateSlice>,
}

impl FactorPanel {
    /// Assemble a panel from precomputed slices.
    #[must_use]
    pub const fn from_parts(
        factors: Vec<FactorMeta>,
        values: BTreeMap<Date, BTreeMap<String, CrossSection>>,
    ) -> Self {
        Self { factors, values }
    }

    /// Factors in computation order.
    #[must_use]
    pub fn factors(&self) -> &[FactorMeta] {
        &self.factors
    }

    /// Rebalance dates, ascending.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.values.keys().copied()
    }

    /// Raw values of `factor` at `date`.
    #[must_use]
    pub fn cross_section(&self, date: Date, factor: &str) -> Option<&CrossSection> {
        self.values.get(&date)?.get(factor)
    }

    /// Instruments scored at `date`.
    #[must_use]
    pub fn universe(&self, date: Date) -> BTreeSet<Symbol> {
        self.values
            .get(&date)
            .into_iter()
            .flat_map(|slice| slice.values())
            .flat_map(|section| section.keys().cloned())
            .collect()
    }

    /// Raw value of one (date, factor, instrument), `None` when undefined or
    /// not scored.
    #[must_use]
    pub fn raw_value(&self, date: Date, factor: &str, symbol: &str) -> Option<f64> {
        self.cross_section(date, factor)?.get(symbol).copied().flatten()
    }

    /// Number of instruments with a defined value for `factor` at `date`.
    #[must_use]
    pub fn defined_count(&self, date: Date, factor: &str) -> usize {
        self.cross_section(date, factor)
            .map_or(0, |section| section.values().filter(|v| v.is_some()).count())
    }

    /// Flatten into one record per (date, factor, instrument).
    #[must_use]
    pub fn signals(&self) -> Vec<FactorSignal> {
        self.values
            .iter()
            .flat_map(|(date, slice)| {
                slice.iter().flat_map(move |(factor, section)| {
                    section.iter().map(move |(symbol, value)| FactorSignal {
                        symbol: symbol.clone(),
                        date: *date,
                        factor: factor.clone(),
                        raw_value: *value,
                    })
                })
            })
            .collect()
    }

    /// Long-format frame with columns `date`, `factor`, `symbol`, `raw_value`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let signals = self.signals();
        let dates: Vec<String> = signals.iter().map(|s| s.date.to_string()).collect();
        let factors: Vec<&str> = signals.iter().map(|s| s.factor.as_str()).collect();
        let symbols: Vec<&str> = signals.iter().map(|s| s.symbol.as_str()).collect();
        let values: Vec<Option<f64>> = signals.iter().map(|s| s.raw_value).collect();

        Ok(df! {
            "date" => dates,
            "factor" => factors,
            "symbol" => symbols,
            "raw_value" => values,
        }?)
    }
}

/// Computes every configured factor for every instrument of each date's
/// universe.
#[derive(Debug)]
pub struct FactorComputer {
    signals: Vec<Box<dyn Signal>>,
}

impl FactorComputer {
    /// Create a computer over explicit signals.
    #[must_use]
    pub fn new(signals: Vec<Box<dyn Signal>>) -> Self {
        Self { signals }
    }

    /// Create a computer for the factors enabled in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ronda_traits::RondaError::SignalNotFound`] for an unknown
    /// factor name and [`ronda_traits::RondaError::InvalidConfig`] for a
    /// duplicate one.
    pub fn from_config(config: &FactorConfig) -> Result<Self> {
        let mut seen = BTreeSet::new();
        let mut signals = Vec::with_capacity(config.enabled.len());
        for name in &config.enabled {
            if !seen.insert(name.as_str()) {
                return Err(ronda_traits::RondaError::InvalidConfig(format!(
                    "factor '{name}' enabled twice"
                )));
            }
            signals.push(create_signal(name, config)?);
        }
        Ok(Self::new(signals))
    }

    /// Names and orientation of the computed factors.
    #[must_use]
    pub fn factors(&self) -> Vec<FactorMeta> {
        self.signals
            .iter()
            .map(|s| FactorMeta {
                name: s.name().to_string(),
                higher_is_better: s.higher_is_better(),
            })
            .collect()
    }

    /// Score one rebalance date.
    ///
    /// Data gaps for a single instrument make its value undefined for that
    /// date; any other error aborts.
    pub fn compute_date(
        &self,
        store: &TimeSeriesStore,
        date: Date,
        universe: &BTreeSet<Symbol>,
    ) -> Result<BTreeMap<String, CrossSection>> {
        let mut slice = BTreeMap::new();
        for signal in &self.signals {
            let view = signal.cutoff(date).map(|cutoff| store.as_of(cutoff));
            let mut section = CrossSection::new();
            for symbol in universe {
                let value = match &view {
                    Some(view) => match signal.compute(view, symbol, date) {
                        Ok(value) => value.filter(|v| v.is_finite()),
                        Err(e) if e.is_local() => {
                            warn!(%date, factor = signal.name(), %symbol, error = %e, "excluding instrument");
                            None
                        }
                        Err(e) => return Err(e),
                    },
                    None => None,
                };
                section.insert(symbol.clone(), value);
            }
            debug!(
                %date,
                factor = signal.name(),
                defined = section.values().filter(|v| v.is_some()).count(),
                universe = universe.len(),
                "computed factor"
            );
            slice.insert(signal.name().to_string(), section);
        }
        Ok(slice)
    }

    /// Score every date in `universes`.
    pub fn compute(
        &self,
        store: &TimeSeriesStore,
        universes: &BTreeMap<Date, BTreeSet<Symbol>>,
    ) -> Result<FactorPanel> {
        let slices: Vec<(Date, DateSlice)> = universes
            .par_iter()
            .map(|(date, universe)| Ok((*date, self.compute_date(store, *date, universe)?)))
            .collect::<Result<_>>()?;

        Ok(FactorPanel::from_parts(self.factors(), slices.into_iter().collect()))
    }
}
