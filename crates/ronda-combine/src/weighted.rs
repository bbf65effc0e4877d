//! Custom-weighted composite scoring.

use std::collections::BTreeMap;

use ronda_traits::{Result, RondaError};

use crate::combiner::{Combiner, CompositePolicy, FactorZScores, rows};

/// Weighted combiner with a fixed weight per factor.
///
/// Weights are renormalized over the factors selected for each instrument.
/// Factors without a weight (or with weight 0) do not take part, neither in
/// the composite nor in the [`CompositePolicy::RequireAll`] check.
#[derive(Debug, Clone)]
pub struct WeightedCombiner {
    weights: BTreeMap<String, f64>,
    policy: CompositePolicy,
}

impl WeightedCombiner {
    /// Create a weighted combiner.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidConfig`] if a weight is negative or not
    /// finite, or if no weight is positive.
    pub fn new(weights: BTreeMap<String, f64>, policy: CompositePolicy) -> Result<Self> {
        if let Some((name, w)) = weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(RondaError::InvalidConfig(format!(
                "weight for '{name}' must be finite and non-negative, got {w}"
            )));
        }
        if !weights.values().any(|w| *w > 0.0) {
            return Err(RondaError::InvalidConfig(
                "custom weights need at least one positive weight".to_string(),
            ));
        }
        Ok(Self { weights, policy })
    }

    /// Configured weight of `factor`, 0 if absent.
    #[must_use]
    pub fn weight(&self, factor: &str) -> f64 {
        self.weights.get(factor).copied().unwrap_or(0.0)
    }
}

impl Combiner for WeightedCombiner {
    fn combine(&self, factors: &[FactorZScores]) -> Result<Vec<Option<f64>>> {
        let active: Vec<usize> = (0..factors.len())
            .filter(|&i| self.weight(&factors[i].name) > 0.0)
            .collect();
        let weights: Vec<f64> = active.iter().map(|&i| self.weight(&factors[i].name)).collect();

        Ok(rows(factors)?
            .iter()
            .map(|row| {
                let row: Vec<Option<f64>> = active.iter().map(|&i| row[i]).collect();
                let defined = self.policy.select(&row)?;
                let total: f64 = defined.iter().map(|(i, _)| weights[*i]).sum();
                let weighted: f64 = defined.iter().map(|(i, z)| weights[*i] * z).sum();
                Some(weighted / total)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "custom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_weighted_renormalizes_over_available() {
        let combiner = WeightedCombiner::new(
            weights(&[("momentum", 3.0), ("value", 1.0)]),
            CompositePolicy::MeanOfAvailable,
        )
        .unwrap();
        let factors = vec![
            FactorZScores {
                name: "momentum".to_string(),
                scores: vec![Some(1.0), None],
            },
            FactorZScores {
                name: "value".to_string(),
                scores: vec![Some(-1.0), Some(2.0)],
            },
            FactorZScores {
                name: "quality".to_string(),
                scores: vec![Some(100.0), Some(100.0)],
            },
        ];

        let result = combiner.combine(&factors).unwrap();
        assert_relative_eq!(result[0].unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(result[1].unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unweighted_factor_ignored_by_require_all() {
        let combiner =
            WeightedCombiner::new(weights(&[("momentum", 1.0)]), CompositePolicy::RequireAll).unwrap();
        let factors = vec![
            FactorZScores {
                name: "momentum".to_string(),
                scores: vec![Some(1.5)],
            },
            FactorZScores {
                name: "value".to_string(),
                scores: vec![None],
            },
        ];

        assert_eq!(combiner.combine(&factors).unwrap(), vec![Some(1.5)]);
    }

    #[test]
    fn test_invalid_weights() {
        assert!(WeightedCombiner::new(weights(&[("momentum", -1.0)]), CompositePolicy::default()).is_err());
        assert!(WeightedCombiner::new(weights(&[("momentum", 0.0)]), CompositePolicy::default()).is_err());
        assert!(WeightedCombiner::new(BTreeMap::new(), CompositePolicy::default()).is_err());
    }
}
