//! Composite scoring configuration.

use std::collections::BTreeMap;

use ronda_traits::Result;
use serde::{Deserialize, Serialize};

use crate::combiner::{Combiner, CompositePolicy};
use crate::equal_weight::EqualWeightCombiner;
use crate::rank_sum::RankSumCombiner;
use crate::weighted::WeightedCombiner;

/// Composite combination method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMethod {
    /// Mean of z-scores.
    #[default]
    EqualWeight,
    /// Negated mean cross-sectional rank.
    RankSum,
    /// Fixed per-factor weights.
    Custom,
}

/// Configuration of the composite score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// Combination method (default: `equal_weight`).
    pub method: CombineMethod,

    /// Treatment of partially defined instruments (default:
    /// `mean_of_available`).
    pub policy: CompositePolicy,

    /// Per-factor weights, used by the `custom` method only.
    pub weights: BTreeMap<String, f64>,
}

impl CompositeConfig {
    /// Build the configured combiner.
    ///
    /// # Errors
    ///
    /// Returns [`ronda_traits::RondaError::InvalidConfig`] for invalid custom
    /// weights.
    pub fn build(&self) -> Result<Box<dyn Combiner>> {
        Ok(match self.method {
            CombineMethod::EqualWeight => Box::new(EqualWeightCombiner::new(self.policy)),
            CombineMethod::RankSum => Box::new(RankSumCombiner::new(self.policy)),
            CombineMethod::Custom => Box::new(WeightedCombiner::new(self.weights.clone(), self.policy)?),
        })
    }
}
