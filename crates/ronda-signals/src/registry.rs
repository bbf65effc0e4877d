//! Signal registry for discovering and constructing the available factors.

use ronda_traits::{Result, RondaError};
use serde::{Deserialize, Serialize};

use crate::config::FactorConfig;
use crate::momentum::PriceMomentum;
use crate::quality::GrossProfitability;
use crate::signal::Signal;
use crate::value::EarningsYield;
use crate::volatility::TrailingVolatility;

/// Signal category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    /// Price momentum signals
    Momentum,
    /// Valuation signals
    Value,
    /// Profitability and quality signals
    Quality,
    /// Return dispersion signals
    Volatility,
}

impl SignalCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Momentum => "Price momentum and trend-following signals",
            Self::Value => "Valuation metrics comparing fundamentals to price",
            Self::Quality => "Profitability and operational efficiency metrics",
            Self::Volatility => "Trailing return dispersion, low preferred",
        }
    }
}

/// Metadata about a signal.
#[derive(Debug, Clone, Serialize)]
pub struct SignalInfo {
    /// Unique identifier for the signal
    pub name: &'static str,

    /// Category classification
    pub category: SignalCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Default months of history or reporting lag
    pub typical_lookback_months: u32,

    /// Whether the signal requires fundamental data
    pub requires_fundamentals: bool,

    /// Whether larger raw values rank higher
    pub higher_is_better: bool,
}

/// Get information about all available signals.
#[must_use]
pub fn available_signals() -> Vec<SignalInfo> {
    vec![
        SignalInfo {
            name: "momentum",
            category: SignalCategory::Momentum,
            description: "12-month price return skipping the most recent month",
            typical_lookback_months: 13,
            requires_fundamentals: false,
            higher_is_better: true,
        },
        SignalInfo {
            name: "value",
            category: SignalCategory::Value,
            description: "Trailing twelve month earnings over market cap, one quarter lag",
            typical_lookback_months: 3,
            requires_fundamentals: true,
            higher_is_better: true,
        },
        SignalInfo {
            name: "quality",
            category: SignalCategory::Quality,
            description: "Gross profit over total assets, one quarter lag",
            typical_lookback_months: 3,
            requires_fundamentals: true,
            higher_is_better: true,
        },
        SignalInfo {
            name: "volatility",
            category: SignalCategory::Volatility,
            description: "Sample std of the trailing 12 monthly returns",
            typical_lookback_months: 12,
            requires_fundamentals: false,
            higher_is_better: false,
        },
    ]
}

/// Get all signals in a specific category.
#[must_use]
pub fn signals_by_category(category: &SignalCategory) -> Vec<SignalInfo> {
    available_signals()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Get information about a specific signal by name.
#[must_use]
pub fn get_signal_info(name: &str) -> Option<SignalInfo> {
    available_signals()
        .into_iter()
        .find(|info| info.name == name)
}

/// Get all signal categories with signals.
#[must_use]
pub fn available_categories() -> Vec<SignalCategory> {
    let mut categories: Vec<_> = available_signals()
        .into_iter()
        .map(|info| info.category)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Construct the signal registered under `name`, parameterized by `config`.
///
/// # Errors
///
/// Returns [`RondaError::SignalNotFound`] for an unknown name.
pub fn create_signal(name: &str, config: &FactorConfig) -> Result<Box<dyn Signal>> {
    match name {
        "momentum" => Ok(Box::new(PriceMomentum::new(config.momentum.clone()))),
        "value" => Ok(Box::new(EarningsYield::new(config.value.clone()))),
        "quality" => Ok(Box::new(GrossProfitability::new(config.quality.clone()))),
        "volatility" => Ok(Box::new(TrailingVolatility::new(config.volatility.clone()))),
        other => Err(RondaError::SignalNotFound(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_signals() {
        let names: Vec<_> = available_signals().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["momentum", "value", "quality", "volatility"]);
    }

    #[test]
    fn test_signals_by_category() {
        assert_eq!(signals_by_category(&SignalCategory::Momentum).len(), 1);
        assert_eq!(signals_by_category(&SignalCategory::Volatility).len(), 1);
    }

    #[test]
    fn test_get_signal_info() {
        let info = get_signal_info("volatility").unwrap();
        assert_eq!(info.category, SignalCategory::Volatility);
        assert!(!info.higher_is_better);
        assert!(!info.requires_fundamentals);

        assert!(get_signal_info("nonexistent_signal").is_none());
    }

    #[test]
    fn test_available_categories() {
        assert_eq!(
            available_categories(),
            vec![
                SignalCategory::Momentum,
                SignalCategory::Value,
                SignalCategory::Quality,
                SignalCategory::Volatility,
            ]
        );
    }

    #[test]
    fn test_create_signal_matches_registry() {
        let config = FactorConfig::default();
        for info in available_signals() {
            let signal = create_signal(info.name, &config).unwrap();
            assert_eq!(signal.name(), info.name);
            assert_eq!(signal.category(), info.category);
            assert_eq!(signal.higher_is_better(), info.higher_is_better);
            assert_eq!(signal.lookback_months(), info.typical_lookback_months);
            assert_eq!(
                signal.required_fields().iter().any(|f| f.is_fundamental()),
                info.requires_fundamentals
            );
        }
    }

    #[test]
    fn test_create_unknown_signal() {
        let err = create_signal("carry", &FactorConfig::default()).unwrap_err();
        assert!(matches!(err, RondaError::SignalNotFound(_)));
    }
}
