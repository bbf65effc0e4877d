//! Momentum signals based on historical price returns.
//!
//! The classic 12-1 momentum signal compares the month-end price one month
//! before the rebalance date with the month-end price thirteen months before
//! it, skipping the most recent month to avoid short-term reversal.

mod price_momentum;

pub use price_momentum::{MomentumConfig, PriceMomentum};
