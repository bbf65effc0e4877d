//! Rank-sum composite scoring.

use ronda_traits::{Result, stats};

use crate::combiner::{Combiner, CompositePolicy, FactorZScores, rows};

/// Rank-sum combiner.
///
/// Each factor is ranked across the instruments where it is defined (1 =
/// best, ties share the average rank). The composite is the negated mean rank
/// over the selected factors, so higher composites are still better. Less
/// sensitive to outliers than averaging z-scores.
#[derive(Debug, Clone, Default)]
pub struct RankSumCombiner {
    policy: CompositePolicy,
}

impl RankSumCombiner {
    /// Create a new rank-sum combiner with the given policy.
    #[must_use]
    pub const fn new(policy: CompositePolicy) -> Self {
        Self { policy }
    }
}

/// Per-instrument descending ranks of one factor, `None` where undefined.
fn factor_ranks(scores: &[Option<f64>]) -> Vec<Option<f64>> {
    let defined: Vec<f64> = scores.iter().flatten().copied().collect();
    let mut ranks = stats::descending_ranks(&defined).into_iter();
    scores
        .iter()
        .map(|s| s.and_then(|_| ranks.next()))
        .collect()
}

impl Combiner for RankSumCombiner {
    fn combine(&self, factors: &[FactorZScores]) -> Result<Vec<Option<f64>>> {
        let ranked: Vec<FactorZScores> = factors
            .iter()
            .map(|f| FactorZScores {
                name: f.name.clone(),
                scores: factor_ranks(&f.scores),
            })
            .collect();

        Ok(rows(&ranked)?
            .iter()
            .map(|row| {
                let defined = self.policy.select(row)?;
                Some(-defined.iter().map(|(_, r)| r).sum::<f64>() / defined.len() as f64)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "rank_sum"
    }
}
