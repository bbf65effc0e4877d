//! Quality signals based on lagged fundamental snapshots.

mod gross_profitability;

pub use gross_profitability::{GrossProfitability, GrossProfitabilityConfig};
