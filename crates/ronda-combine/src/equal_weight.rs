//! Equal-weighted composite scoring.

use ronda_traits::Result;

use crate::combiner::{Combiner, CompositePolicy, FactorZScores, rows};

/// Equal-weighted combiner: the composite is the arithmetic mean of the
/// instrument's factor z-scores.
///
/// With [`CompositePolicy::MeanOfAvailable`] the mean runs over the defined
/// z-scores only, so an instrument with a single defined factor still ranks.
/// With [`CompositePolicy::RequireAll`] any undefined factor excludes the
/// instrument.
///
/// # Examples
///
/// ```
/// use ronda_combine::{Combiner, CompositePolicy, EqualWeightCombiner, FactorZScores};
///
/// let combiner = EqualWeightCombiner::new(CompositePolicy::MeanOfAvailable);
/// let factors = vec![
///     FactorZScores { name: "momentum".to_string(), scores: vec![Some(1.0), Some(-1.0)] },
///     FactorZScores { name: "value".to_string(), scores: vec![Some(0.0), None] },
/// ];
///
/// let composite = combiner.combine(&factors).unwrap();
/// assert_eq!(composite, vec![Some(0.5), Some(-1.0)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EqualWeightCombiner {
    policy: CompositePolicy,
}

impl EqualWeightCombiner {
    /// Create a new equal-weight combiner with the given policy.
    #[must_use]
    pub const fn new(policy: CompositePolicy) -> Self {
        Self { policy }
    }

    /// Policy for partially defined instruments.
    #[must_use]
    pub const fn policy(&self) -> CompositePolicy {
        self.policy
    }
}

impl Combiner for EqualWeightCombiner {
    fn combine(&self, factors: &[FactorZScores]) -> Result<Vec<Option<f64>>> {
        Ok(rows(factors)?
            .iter()
            .map(|row| {
                let defined = self.policy.select(row)?;
                Some(defined.iter().map(|(_, z)| z).sum::<f64>() / defined.len() as f64)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "equal_weight"
    }
}
