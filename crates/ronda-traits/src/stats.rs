//! Statistical utility functions for cross-sections and return series.
//!
//! Cross-sectional z-scores use the population standard deviation so that the
//! standardized slice has mean 0 and population std 1 exactly (up to
//! rounding). Time-series dispersion (volatility) uses the sample standard
//! deviation.

use ndarray::Array1;

/// Standard deviations at or below this threshold are treated as zero.
pub const MIN_STD_THRESHOLD: f64 = 1e-12;

/// Minimum cross-section size for which z-scores are defined.
pub const MIN_CROSS_SECTION: usize = 2;

/// Why a slice could not be standardized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// Fewer than [`MIN_CROSS_SECTION`] finite members.
    TooFewMembers,
    /// Population standard deviation at or below [`MIN_STD_THRESHOLD`].
    ZeroVariance,
}

impl Degeneracy {
    /// Human-readable reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::TooFewMembers => "fewer than 2 members",
            Self::ZeroVariance => "zero cross-sectional variance",
        }
    }
}

/// Z-score standardization result containing computed statistics.
#[derive(Debug, Clone, Copy)]
pub struct StandardizeResult {
    /// Mean of the input values.
    pub mean: f64,
    /// Population standard deviation of the input values.
    pub std: f64,
}

/// Standardize a cross-section to z-scores (mean 0, population std 1).
///
/// All inputs must be finite; callers drop undefined members before calling.
///
/// # Errors
///
/// Returns the [`Degeneracy`] when the slice has fewer than two members or
/// zero dispersion. No division by zero is ever performed.
///
/// # Examples
///
/// ```
/// use ndarray::Array1;
/// use ronda_traits::stats::zscores;
///
/// let values = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
/// let (z, result) = zscores(&values).unwrap();
///
/// assert!((result.mean - 3.0).abs() < 1e-12);
/// assert!(z.sum().abs() < 1e-12);
/// ```
pub fn zscores(values: &Array1<f64>) -> Result<(Array1<f64>, StandardizeResult), Degeneracy> {
    if values.len() < MIN_CROSS_SECTION {
        return Err(Degeneracy::TooFewMembers);
    }

    let mean = values.mean().ok_or(Degeneracy::TooFewMembers)?;
    let std = values.std(0.0);

    if !std.is_finite() || std <= MIN_STD_THRESHOLD {
        return Err(Degeneracy::ZeroVariance);
    }

    Ok(((values - mean) / std, StandardizeResult { mean, std }))
}

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N-1 denominator), `None` below two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(Array1::from_vec(values.to_vec()).std(1.0))
}

/// Population standard deviation, `None` for an empty slice.
#[must_use]
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Array1::from_vec(values.to_vec()).std(0.0))
}

/// Pearson correlation of two equally long samples.
///
/// `None` when fewer than two pairs exist or either side has no dispersion.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        vx += (a - mx).powi(2);
        vy += (b - my).powi(2);
    }

    if vx <= MIN_STD_THRESHOLD || vy <= MIN_STD_THRESHOLD {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Average ranks (1 = largest) with ties sharing the mean of their positions.
#[must_use]
pub fn descending_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}
