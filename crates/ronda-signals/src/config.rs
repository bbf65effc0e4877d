//! Factor configuration.

use serde::{Deserialize, Serialize};

use crate::momentum::MomentumConfig;
use crate::quality::GrossProfitabilityConfig;
use crate::value::EarningsYieldConfig;
use crate::volatility::VolatilityConfig;

/// Which factors to compute and how each one is parameterized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorConfig {
    /// Registry names of the enabled factors, in output order.
    pub enabled: Vec<String>,

    /// Momentum parameters.
    pub momentum: MomentumConfig,

    /// Earnings yield parameters.
    pub value: EarningsYieldConfig,

    /// Gross profitability parameters.
    pub quality: GrossProfitabilityConfig,

    /// Trailing volatility parameters.
    pub volatility: VolatilityConfig,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            enabled: ["momentum", "value", "quality", "volatility"]
                .into_iter()
                .map(String::from)
                .collect(),
            momentum: MomentumConfig::default(),
            value: EarningsYieldConfig::default(),
            quality: GrossProfitabilityConfig::default(),
            volatility: VolatilityConfig::default(),
        }
    }
}
