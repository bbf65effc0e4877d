//! Value signals based on lagged fundamental snapshots.
//!
//! Fundamentals are read as of a cutoff one quarter before the rebalance
//! month to approximate the delay between a period end and its report date.

mod earnings_yield;

pub use earnings_yield::{DEFAULT_FUNDAMENTAL_LAG_MONTHS, EarningsYield, EarningsYieldConfig};
