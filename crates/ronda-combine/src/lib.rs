//! Cross-sectional normalization and composite scoring.
//!
//! Raw factor values from `ronda-signals` are standardized per (date, factor)
//! into z-scores, oriented so that higher is always better, and then combined
//! into a composite score per instrument. Combination strategies:
//!
//! - [`EqualWeightCombiner`]: mean of the factor z-scores
//! - [`RankSumCombiner`]: negated mean cross-sectional rank
//! - [`WeightedCombiner`]: fixed per-factor weights
//!
//! Each respects a [`CompositePolicy`] deciding whether partially scored
//! instruments still rank.
//!
//! # Examples
//!
//! ```
//! use ronda_combine::{Combiner, CompositePolicy, EqualWeightCombiner, FactorZScores};
//!
//! let combiner = EqualWeightCombiner::new(CompositePolicy::RequireAll);
//! let factors = vec![
//!     FactorZScores { name: "momentum".to_string(), scores: vec![Some(0.5), Some(-0.2)] },
//!     FactorZScores { name: "value".to_string(), scores: vec![Some(-0.3), None] },
//! ];
//!
//! let composite = combiner.combine(&factors).unwrap();
//! assert_eq!(composite[1], None);
//! ```

mod combiner;
mod config;
mod equal_weight;
mod normalizer;
mod rank_sum;
mod weighted;

pub use combiner::{Combiner, CompositePolicy, FactorZScores};
pub use config::{CombineMethod, CompositeConfig};
pub use equal_weight::EqualWeightCombiner;
pub use normalizer::{
    CompositePanel, CrossSectionalNormalizer, NormalizedPanel, NormalizedScore, standardize,
};
pub use rank_sum::RankSumCombiner;
pub use weighted::WeightedCombiner;
