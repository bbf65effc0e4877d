//! Common types used throughout the ronda workspace.
//!
//! This module defines the instrument and date types, the set of observation
//! fields a provider may supply, and the `MarketData` frame wrapper used as
//! the tabular input to the engine.

use std::{fmt, str::FromStr};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RondaError};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// An instrument identifier, typically a ticker such as "AAPL".
pub type Symbol = String;

/// Observation field supplied by a data provider.
///
/// Prices are expected at daily or month-end granularity; fundamentals are
/// month-end (or quarter-end) snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Closing price.
    Price,
    /// Shares outstanding.
    SharesOutstanding,
    /// Trailing twelve months earnings.
    EarningsTtm,
    /// Gross profit.
    GrossProfit,
    /// Total assets.
    TotalAssets,
    /// Market capitalization.
    MarketCap,
}

impl Field {
    /// All fields, in column order.
    pub const ALL: [Self; 6] = [
        Self::Price,
        Self::SharesOutstanding,
        Self::EarningsTtm,
        Self::GrossProfit,
        Self::TotalAssets,
        Self::MarketCap,
    ];

    /// Column name of this field in a long-format input frame.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::SharesOutstanding => "shares_outstanding",
            Self::EarningsTtm => "earnings_ttm",
            Self::GrossProfit => "gross_profit",
            Self::TotalAssets => "total_assets",
            Self::MarketCap => "market_cap",
        }
    }

    /// Whether the field is a fundamental snapshot rather than a price.
    #[must_use]
    pub const fn is_fundamental(&self) -> bool {
        !matches!(self, Self::Price)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = RondaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| RondaError::InvalidData(format!("unknown field '{s}'")))
    }
}

/// Container for raw provider data.
///
/// `MarketData` wraps a long-format Polars DataFrame with one row per
/// (symbol, date) and one column per [`Field`]. Null cells are missing
/// observations.
///
/// # Expected Schema
///
/// - `symbol`: instrument identifier (string)
/// - `date`: observation date (polars `Date` or `YYYY-MM-DD` string)
/// - any subset of `price`, `shares_outstanding`, `earnings_ttm`,
///   `gross_profit`, `total_assets`, `market_cap`
///
/// # Example
///
/// ```no_run
/// use ronda_traits::MarketData;
/// use polars::prelude::*;
///
/// let df = df! {
///     "symbol" => &["AAPL", "MSFT"],
///     "date" => &["2024-01-31", "2024-01-31"],
///     "price" => &[185.0, 397.0],
/// }.unwrap();
///
/// let market_data = MarketData::new(df);
/// ```
#[derive(Debug, Clone)]
pub struct MarketData {
    data: DataFrame,
}

impl MarketData {
    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Gets a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.column(name).ok()
    }

    /// Fields present as columns in this frame.
    pub fn fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.has_column(field.as_str()))
            .collect()
    }

    /// Fails with [`RondaError::MissingColumn`] unless `symbol`, `date` and at
    /// least a `price` column are present.
    pub fn validate(&self) -> Result<()> {
        for col in ["symbol", "date", Field::Price.as_str()] {
            if !self.has_column(col) {
                return Err(RondaError::MissingColumn(col.to_string()));
            }
        }
        Ok(())
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}
