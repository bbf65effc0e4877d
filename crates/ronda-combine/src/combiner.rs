//! Core trait definition for composite scoring.

use std::fmt;

use ronda_traits::Result;
use serde::{Deserialize, Serialize};

/// Z-scores of one factor over a date's scored universe.
///
/// Every `FactorZScores` passed to one [`Combiner::combine`] call is aligned
/// to the same instrument order. `None` marks an instrument whose z-score is
/// undefined at that date.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorZScores {
    /// Factor name.
    pub name: String,

    /// Z-scores for each instrument in the universe.
    pub scores: Vec<Option<f64>>,
}

/// How instruments with some undefined factor z-scores are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositePolicy {
    /// Combine whatever factors are defined; exclude only instruments with no
    /// defined factor.
    #[default]
    MeanOfAvailable,

    /// Exclude any instrument missing one or more factors.
    RequireAll,
}

impl CompositePolicy {
    /// Pick the defined `(factor index, z-score)` pairs for one instrument, or
    /// `None` if the instrument is excluded under this policy.
    #[must_use]
    pub fn select(self, row: &[Option<f64>]) -> Option<Vec<(usize, f64)>> {
        let defined: Vec<(usize, f64)> = row
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .collect();

        match self {
            _ if defined.is_empty() => None,
            Self::RequireAll if defined.len() < row.len() => None,
            _ => Some(defined),
        }
    }
}

/// Combines per-factor z-scores into one composite score per instrument.
///
/// Implementations must be thread-safe (Send + Sync) so one combiner can score
/// many dates.
///
/// # Examples
///
/// ```
/// use ronda_combine::{Combiner, FactorZScores};
///
/// #[derive(Debug)]
/// struct FirstFactor;
///
/// impl Combiner for FirstFactor {
///     fn combine(&self, factors: &[FactorZScores]) -> ronda_traits::Result<Vec<Option<f64>>> {
///         Ok(factors.first().map(|f| f.scores.clone()).unwrap_or_default())
///     }
///
///     fn name(&self) -> &str {
///         "first_factor"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync + fmt::Debug {
    /// Combine aligned factor z-scores into composite scores.
    ///
    /// The output has one entry per instrument, `None` where the instrument
    /// is excluded from composite ranking.
    ///
    /// # Errors
    ///
    /// Returns an error if the factor vectors have mismatched lengths.
    fn combine(&self, factors: &[FactorZScores]) -> Result<Vec<Option<f64>>>;

    /// Get the name of this combination strategy.
    fn name(&self) -> &str;
}

/// Transpose aligned factor vectors into per-instrument rows.
pub(crate) fn rows(factors: &[FactorZScores]) -> Result<Vec<Vec<Option<f64>>>> {
    let Some(first) = factors.first() else {
        return Ok(Vec::new());
    };
    let n = first.scores.len();

    for factor in factors {
        if factor.scores.len() != n {
            return Err(format!(
                "Factor '{}' has {} instruments, expected {}",
                factor.name,
                factor.scores.len(),
                n
            )
            .into());
        }
    }

    Ok((0..n)
        .map(|i| factors.iter().map(|f| f.scores[i]).collect())
        .collect())
}
