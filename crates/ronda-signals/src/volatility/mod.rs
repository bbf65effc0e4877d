//! Volatility signals based on trailing monthly returns.
//!
//! Low volatility is preferred: the signal reports `higher_is_better = false`
//! and the normalizer flips its z-scores before ranking.

mod trailing;

pub use trailing::{TrailingVolatility, VolatilityConfig};
