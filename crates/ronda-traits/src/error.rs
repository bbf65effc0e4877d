//! Error types for the ronda workspace.
//!
//! Missing values are not errors: an insufficient trailing window or an
//! unsatisfied lag yields `None` and flows through the pipeline as data. The
//! variants here cover structural failures and the soft degenerate
//! cross-section condition.

use thiserror::Error;

use crate::types::Date;

/// The main error type for ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// A lookup fell entirely outside the stored range for an instrument,
    /// e.g. the instrument is unknown or has no price history at all.
    #[error("Data gap: {0}")]
    DataGap(String),

    /// A cross-section is too small or has zero dispersion, so z-scores are
    /// undefined for that (date, factor) slice.
    #[error("Degenerate cross-section for {factor} on {date}: {reason} ({members} members)")]
    DegenerateCrossSection {
        /// Rebalance date of the slice.
        date: Date,
        /// Factor name of the slice.
        factor: String,
        /// Number of instruments with a defined raw value.
        members: usize,
        /// Why the slice is degenerate.
        reason: String,
    },

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error when a configuration value is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No usable data exists anywhere in the run.
    #[error("No usable data: {0}")]
    NoUsableData(String),

    /// Error when a signal is not found in the registry.
    #[error("Signal not found: {0}")]
    SignalNotFound(String),

    /// Error when a date is out of range or cannot be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error reading configuration or data files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error decoding a JSON configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl RondaError {
    /// Returns true for errors that only narrow a single date's universe
    /// and must never abort a run.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::DataGap(_) | Self::DegenerateCrossSection { .. })
    }
}

impl From<String> for RondaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RondaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for ronda operations.
pub type Result<T> = std::result::Result<T, RondaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RondaError::DataGap("no prices for XYZ".to_string());
        assert_eq!(err.to_string(), "Data gap: no prices for XYZ");

        let err = RondaError::MissingColumn("price".to_string());
        assert_eq!(err.to_string(), "Missing required column: price");
    }

    #[test]
    fn test_degenerate_display() {
        let err = RondaError::DegenerateCrossSection {
            date: Date::from_ymd_opt(2024, 1, 31).unwrap(),
            factor: "momentum".to_string(),
            members: 1,
            reason: "fewer than 2 members".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Degenerate cross-section for momentum on 2024-01-31: fewer than 2 members (1 members)"
        );
    }

    #[test]
    fn test_local_errors() {
        assert!(RondaError::DataGap("x".into()).is_local());
        assert!(!RondaError::NoUsableData("x".into()).is_local());
        assert!(!RondaError::InvalidConfig("x".into()).is_local());
    }

    #[test]
    fn test_error_from_str() {
        let err: RondaError = "boom".into();
        assert!(matches!(err, RondaError::Other(_)));
    }
}
