//! Top-quantile, equal-weight portfolio construction.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use ronda_traits::{Date, Result, RondaError, Symbol};
use serde::{Deserialize, Serialize};

/// Default fraction of the ranked cross-section held.
pub const DEFAULT_QUANTILE: f64 = 0.2;

/// Long-only holdings fixed at a rebalance date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Rebalance date the holdings were selected at.
    pub date: Date,
    /// Weight per held instrument.
    pub holdings: BTreeMap<Symbol, f64>,
}

impl Portfolio {
    /// A portfolio with no holdings.
    #[must_use]
    pub const fn empty(date: Date) -> Self {
        Self {
            date,
            holdings: BTreeMap::new(),
        }
    }

    /// Whether nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Number of holdings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Weight of `symbol`, 0 if not held.
    #[must_use]
    pub fn weight(&self, symbol: &str) -> f64 {
        self.holdings.get(symbol).copied().unwrap_or(0.0)
    }

    /// Sum of weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.holdings.values().sum()
    }
}

/// Number of instruments selected from a ranked cross-section of `n`.
///
/// `floor(n * quantile)` with a minimum of one for a non-empty cross-section.
/// A small epsilon keeps exact products such as `5 * 0.2` from rounding down.
#[must_use]
pub fn selection_count(n: usize, quantile: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let k = (n as f64 * quantile + 1e-9).floor() as usize;
    k.clamp(1, n)
}

/// Selects the top quantile of a scored cross-section and weights it equally.
#[derive(Debug, Clone)]
pub struct PortfolioConstructor {
    quantile: f64,
    min_cross_section: usize,
}

impl Default for PortfolioConstructor {
    fn default() -> Self {
        Self {
            quantile: DEFAULT_QUANTILE,
            min_cross_section: 1,
        }
    }
}

impl PortfolioConstructor {
    /// Create a constructor.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidConfig`] unless `0 < quantile <= 1` and
    /// `min_cross_section >= 1`.
    pub fn new(quantile: f64, min_cross_section: usize) -> Result<Self> {
        if !(quantile > 0.0 && quantile <= 1.0) {
            return Err(RondaError::InvalidConfig(format!(
                "quantile must be in (0, 1], got {quantile}"
            )));
        }
        if min_cross_section == 0 {
            return Err(RondaError::InvalidConfig(
                "min_cross_section must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            quantile,
            min_cross_section,
        })
    }

    /// Fraction of the cross-section held.
    #[must_use]
    pub const fn quantile(&self) -> f64 {
        self.quantile
    }

    /// Build the portfolio for `date` from instrument scores.
    ///
    /// Scores are ranked descending with ties broken by symbol ascending.
    /// Non-finite scores are ignored. A cross-section smaller than the
    /// configured minimum yields an empty portfolio.
    #[must_use]
    pub fn construct(&self, date: Date, scores: &BTreeMap<Symbol, f64>) -> Portfolio {
        let mut ranked: Vec<(&Symbol, f64)> = scores
            .iter()
            .filter(|(_, s)| s.is_finite())
            .map(|(sym, s)| (sym, *s))
            .collect();

        if ranked.len() < self.min_cross_section {
            return Portfolio::empty(date);
        }

        ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(b.0),
            other => other,
        });

        let k = selection_count(ranked.len(), self.quantile);
        let weight = 1.0 / k as f64;
        Portfolio {
            date,
            holdings: ranked
                .into_iter()
                .take(k)
                .map(|(sym, _)| (sym.clone(), weight))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn scores(pairs: &[(&str, f64)]) -> BTreeMap<Symbol, f64> {
        pairs.iter().map(|(s, v)| ((*s).to_string(), *v)).collect()
    }

    #[test]
    fn test_selection_count() {
        assert_eq!(selection_count(0, 0.2), 0);
        assert_eq!(selection_count(4, 0.2), 1);
        assert_eq!(selection_count(5, 0.2), 1);
        assert_eq!(selection_count(10, 0.2), 2);
        assert_eq!(selection_count(14, 0.2), 2);
        assert_eq!(selection_count(15, 0.2), 3);
        assert_eq!(selection_count(3, 1.0), 3);
    }

    #[test]
    fn test_universe_of_four_selects_one() {
        let constructor = PortfolioConstructor::default();
        let portfolio = constructor.construct(
            d(2024, 6, 30),
            &scores(&[("A", 0.1), ("B", 1.2), ("C", -0.4), ("D", 0.7)]),
        );

        assert_eq!(portfolio.len(), 1);
        assert_abs_diff_eq!(portfolio.weight("B"), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let constructor = PortfolioConstructor::new(0.3, 1).unwrap();
        let cross_section: Vec<(String, f64)> = (0..23).map(|i| (format!("S{i:02}"), f64::from(i).sin())).collect();
        let scores: BTreeMap<Symbol, f64> = cross_section.into_iter().collect();
        let portfolio = constructor.construct(d(2024, 6, 30), &scores);

        assert_eq!(portfolio.len(), 6);
        assert_abs_diff_eq!(portfolio.total_weight(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ties_broken_by_symbol() {
        let constructor = PortfolioConstructor::new(0.4, 1).unwrap();
        let portfolio = constructor.construct(
            d(2024, 6, 30),
            &scores(&[("E", 1.0), ("B", 1.0), ("D", 1.0), ("A", 0.5), ("C", 1.0)]),
        );

        assert_eq!(portfolio.holdings.keys().collect::<Vec<_>>(), vec!["B", "C"]);
    }

    #[test]
    fn test_min_cross_section() {
        let constructor = PortfolioConstructor::new(0.2, 5).unwrap();
        let portfolio = constructor.construct(d(2024, 6, 30), &scores(&[("A", 1.0), ("B", 2.0)]));
        assert!(portfolio.is_empty());
    }

    #[test]
    fn test_empty_scores() {
        let portfolio = PortfolioConstructor::default().construct(d(2024, 6, 30), &BTreeMap::new());
        assert!(portfolio.is_empty());
    }

    #[test]
    fn test_invalid_config() {
        assert!(PortfolioConstructor::new(0.0, 1).is_err());
        assert!(PortfolioConstructor::new(1.5, 1).is_err());
        assert!(PortfolioConstructor::new(0.2, 0).is_err());
    }
}
