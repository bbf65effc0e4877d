//! Cross-sectional z-score normalization and composite panels.
//!
//! Each (date, factor) slice is standardized independently over the
//! instruments with a defined raw value. Degenerate slices (fewer than two
//! members, or zero dispersion) leave every z-score of the slice undefined and
//! are logged; they never abort a run.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array1;
use polars::prelude::*;
use ronda_signals::{CrossSection, FactorMeta, FactorPanel};
use ronda_traits::{Date, Result, RondaError, Symbol, stats};
use tracing::{debug, warn};

use crate::combiner::{Combiner, FactorZScores};

/// One standardized value: `(instrument, rebalance date, factor, z-score)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedScore {
    /// Instrument identifier.
    pub symbol: Symbol,
    /// Rebalance date.
    pub date: Date,
    /// Factor name.
    pub factor: String,
    /// Z-score, `None` when undefined.
    pub z_score: Option<f64>,
}

/// Standardize one (date, factor) slice.
///
/// Undefined raw values stay undefined. Lower-is-better factors are negated
/// after standardization so a larger z-score is always preferable.
///
/// # Errors
///
/// Returns [`RondaError::DegenerateCrossSection`] when fewer than two members
/// have a defined value or their population std is zero.
pub fn standardize(
    date: Date,
    factor: &FactorMeta,
    section: &CrossSection,
) -> Result<CrossSection> {
    let defined: Vec<(&Symbol, f64)> = section
        .iter()
        .filter_map(|(s, v)| v.filter(|v| v.is_finite()).map(|v| (s, v)))
        .collect();
    let values = Array1::from_iter(defined.iter().map(|(_, v)| *v));

    let (z, _) = stats::zscores(&values).map_err(|d| RondaError::DegenerateCrossSection {
        date,
        factor: factor.name.clone(),
        members: defined.len(),
        reason: d.reason().to_string(),
    })?;
    let sign = if factor.higher_is_better { 1.0 } else { -1.0 };

    let mut out: CrossSection = section.keys().map(|s| (s.clone(), None)).collect();
    for ((symbol, _), z) in defined.iter().zip(z.iter()) {
        out.insert((*symbol).clone(), Some(sign * z));
    }
    Ok(out)
}

/// Z-scores indexed by date, factor and instrument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPanel {
    factors: Vec<String>,
    values: BTreeMap<Date, BTreeMap<String, CrossSection>>,
}

impl NormalizedPanel {
    /// Factor names in computation order.
    #[must_use]
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    /// Rebalance dates, ascending.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.values.keys().copied()
    }

    /// Z-scores of `factor` at `date`, including undefined members.
    #[must_use]
    pub fn cross_section(&self, date: Date, factor: &str) -> Option<&CrossSection> {
        self.values.get(&date)?.get(factor)
    }

    /// Z-score of one (date, factor, instrument).
    #[must_use]
    pub fn z_score(&self, date: Date, factor: &str, symbol: &str) -> Option<f64> {
        self.cross_section(date, factor)?.get(symbol).copied().flatten()
    }

    /// Defined z-scores of `factor` at `date`.
    #[must_use]
    pub fn defined(&self, date: Date, factor: &str) -> BTreeMap<Symbol, f64> {
        self.cross_section(date, factor)
            .into_iter()
            .flatten()
            .filter_map(|(s, z)| z.map(|z| (s.clone(), z)))
            .collect()
    }

    /// Flatten into one record per (date, factor, instrument).
    #[must_use]
    pub fn scores(&self) -> Vec<NormalizedScore> {
        let mut out = Vec::new();
        for (date, slice) in &self.values {
            for (factor, section) in slice {
                for (symbol, z) in section {
                    out.push(NormalizedScore {
                        symbol: symbol.clone(),
                        date: *date,
                        factor: factor.clone(),
                        z_score: *z,
                    });
                }
            }
        }
        out
    }

    /// Combine the factor z-scores of every date into composite scores.
    ///
    /// # Errors
    ///
    /// Propagates combiner errors.
    pub fn composite(&self, combiner: &dyn Combiner) -> Result<CompositePanel> {
        let mut values = BTreeMap::new();
        for (date, slice) in &self.values {
            let symbols: Vec<&Symbol> = slice
                .values()
                .flat_map(|section| section.keys())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            let factors: Vec<FactorZScores> = self
                .factors
                .iter()
                .map(|name| FactorZScores {
                    name: name.clone(),
                    scores: symbols
                        .iter()
                        .map(|s| slice.get(name).and_then(|section| section.get(*s).copied().flatten()))
                        .collect(),
                })
                .collect();

            let scores: BTreeMap<Symbol, f64> = symbols
                .iter()
                .zip(combiner.combine(&factors)?)
                .filter_map(|(s, c)| c.filter(|c| c.is_finite()).map(|c| ((*s).clone(), c)))
                .collect();

            debug!(
                %date,
                combiner = combiner.name(),
                ranked = scores.len(),
                universe = symbols.len(),
                "composite scores"
            );
            values.insert(*date, scores);
        }

        Ok(CompositePanel {
            method: combiner.name().to_string(),
            values,
        })
    }

    /// Long-format frame with columns `date`, `factor`, `symbol`, `z_score`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let scores = self.scores();
        let dates: Vec<String> = scores.iter().map(|s| s.date.to_string()).collect();
        let factors: Vec<&str> = scores.iter().map(|s| s.factor.as_str()).collect();
        let symbols: Vec<&str> = scores.iter().map(|s| s.symbol.as_str()).collect();
        let z: Vec<Option<f64>> = scores.iter().map(|s| s.z_score).collect();

        Ok(df! {
            "date" => dates,
            "factor" => factors,
            "symbol" => symbols,
            "z_score" => z,
        }?)
    }
}

/// Composite scores of the instruments eligible for ranking at each date.
///
/// Instruments excluded by the composite policy have no entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositePanel {
    method: String,
    values: BTreeMap<Date, BTreeMap<Symbol, f64>>,
}

impl CompositePanel {
    /// Name of the combiner that produced the panel.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Rebalance dates, ascending.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.values.keys().copied()
    }

    /// Ranked instruments and their composite scores at `date`.
    #[must_use]
    pub fn scores(&self, date: Date) -> Option<&BTreeMap<Symbol, f64>> {
        self.values.get(&date)
    }

    /// Composite score of one instrument.
    #[must_use]
    pub fn score(&self, date: Date, symbol: &str) -> Option<f64> {
        self.values.get(&date)?.get(symbol).copied()
    }
}

/// Standardizes raw factor values across each date's universe.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossSectionalNormalizer;

impl CrossSectionalNormalizer {
    /// Create a normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Standardize every (date, factor) slice of `panel`.
    ///
    /// Degenerate slices are logged and left fully undefined.
    #[must_use]
    pub fn normalize(&self, panel: &FactorPanel) -> NormalizedPanel {
        let mut values = BTreeMap::new();
        for date in panel.dates() {
            let mut slice = BTreeMap::new();
            for factor in panel.factors() {
                let Some(section) = panel.cross_section(date, &factor.name) else {
                    continue;
                };
                let z = match standardize(date, factor, section) {
                    Ok(z) => z,
                    Err(e) => {
                        warn!(error = %e, "degenerate cross-section");
                        section.keys().map(|s| (s.clone(), None)).collect()
                    }
                };
                slice.insert(factor.name.clone(), z);
            }
            values.insert(date, slice);
        }

        NormalizedPanel {
            factors: panel.factors().iter().map(|f| f.name.clone()).collect(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::{CompositePolicy, EqualWeightCombiner};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn meta(name: &str, higher_is_better: bool) -> FactorMeta {
        FactorMeta {
            name: name.to_string(),
            higher_is_better,
        }
    }

    fn section(values: &[(&str, Option<f64>)]) -> CrossSection {
        values.iter().map(|(s, v)| ((*s).to_string(), *v)).collect()
    }

    fn panel() -> FactorPanel {
        let date = d(2024, 6, 30);
        let slice = BTreeMap::from([
            (
                "momentum".to_string(),
                section(&[("A", Some(0.3)), ("B", Some(-0.1)), ("C", Some(0.05)), ("D", None), ("E", Some(0.12))]),
            ),
            (
                "value".to_string(),
                section(&[("A", Some(0.04)), ("B", Some(0.04)), ("C", Some(0.04)), ("D", Some(0.04)), ("E", None)]),
            ),
            (
                "volatility".to_string(),
                section(&[("A", Some(0.2)), ("B", Some(0.1)), ("C", None), ("D", Some(0.4)), ("E", None)]),
            ),
        ]);
        FactorPanel::from_parts(
            vec![meta("momentum", true), meta("value", true), meta("volatility", false)],
            BTreeMap::from([(date, slice)]),
        )
    }

    #[test]
    fn test_zscores_mean_zero_std_one() {
        let normalized = CrossSectionalNormalizer::new().normalize(&panel());
        let z: Vec<f64> = normalized.defined(d(2024, 6, 30), "momentum").into_values().collect();

        assert_eq!(z.len(), 4);
        assert_abs_diff_eq!(stats::mean(&z).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats::population_std(&z).unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(normalized.z_score(d(2024, 6, 30), "momentum", "D"), None);
    }

    #[test]
    fn test_zero_variance_slice_is_undefined() {
        let normalized = CrossSectionalNormalizer::new().normalize(&panel());
        let section = normalized.cross_section(d(2024, 6, 30), "value").unwrap();

        assert_eq!(section.len(), 5);
        assert!(section.values().all(Option::is_none));
    }

    #[test]
    fn test_lower_is_better_is_negated() {
        let normalized = CrossSectionalNormalizer::new().normalize(&panel());
        let date = d(2024, 6, 30);

        let b = normalized.z_score(date, "volatility", "B").unwrap();
        let dd = normalized.z_score(date, "volatility", "D").unwrap();
        assert!(b > dd, "lowest volatility must score highest");
        let z: Vec<f64> = normalized.defined(date, "volatility").into_values().collect();
        assert_abs_diff_eq!(stats::population_std(&z).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_too_few_members() {
        let err = standardize(
            d(2024, 6, 30),
            &meta("momentum", true),
            &section(&[("A", Some(1.0)), ("B", None)]),
        )
        .unwrap_err();
        assert!(matches!(err, RondaError::DegenerateCrossSection { members: 1, .. }));
    }

    #[test]
    fn test_zero_variance_members_excluded_from_composite() {
        let date = d(2024, 6, 30);
        let only_value = FactorPanel::from_parts(
            vec![meta("momentum", true), meta("value", true)],
            BTreeMap::from([(
                date,
                BTreeMap::from([
                    ("momentum".to_string(), section(&[("A", Some(1.0)), ("B", Some(2.0)), ("C", None)])),
                    ("value".to_string(), section(&[("A", Some(0.1)), ("B", Some(0.1)), ("C", Some(0.1))])),
                ]),
            )]),
        );
        let normalized = CrossSectionalNormalizer::new().normalize(&only_value);
        let composite = normalized
            .composite(&EqualWeightCombiner::new(CompositePolicy::MeanOfAvailable))
            .unwrap();

        let scores = composite.scores(date).unwrap();
        assert_eq!(scores.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(composite.score(date, "C"), None);
    }

    #[test]
    fn test_composite_policy_changes_eligibility() {
        let normalized = CrossSectionalNormalizer::new().normalize(&panel());
        let date = d(2024, 6, 30);

        let available = normalized
            .composite(&EqualWeightCombiner::new(CompositePolicy::MeanOfAvailable))
            .unwrap();
        let strict = normalized
            .composite(&EqualWeightCombiner::new(CompositePolicy::RequireAll))
            .unwrap();

        // Value is degenerate, so nobody has all three factors.
        assert_eq!(available.scores(date).unwrap().len(), 5);
        assert!(strict.scores(date).unwrap().is_empty());
        assert_eq!(available.method(), "equal_weight");
    }

    #[test]
    fn test_to_frame() {
        let normalized = CrossSectionalNormalizer::new().normalize(&panel());
        let df = normalized.to_frame().unwrap();
        assert_eq!(df.height(), 15);
    }
}
