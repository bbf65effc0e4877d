//! Ingestion of long-format provider frames.

use polars::prelude::*;
use ronda_traits::{CE_TO_UNIX_EPOCH_DAYS, Date, MarketData, Result, RondaError};
use tracing::{info, warn};

use crate::store::{StoreBuilder, TimeSeriesStore};

/// Parse a `date` column holding either polars dates or `YYYY-MM-DD` strings.
pub fn parse_dates(column: &Column) -> Result<Vec<Option<Date>>> {
    let series = column.as_materialized_series();
    match series.dtype() {
        DataType::Date => Ok(series
            .date()?
            .into_iter()
            .map(|d: Option<i32>| {
                d.and_then(|days| Date::from_num_days_from_ce_opt(days + CE_TO_UNIX_EPOCH_DAYS))
            })
            .collect()),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|s: Option<&str>| s.map(parse_date).transpose())
            .collect(),
        other => Err(RondaError::InvalidData(format!(
            "unsupported date column type {other}"
        ))),
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<Date> {
    Date::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| RondaError::InvalidDate(format!("'{s}': {e}")))
}

impl StoreBuilder {
    /// Ingest every observation in a long-format frame.
    ///
    /// Rows with a null symbol or date are skipped. Null or non-finite field
    /// cells are missing observations. Returns the number of observations
    /// recorded.
    pub fn load_market_data(&mut self, data: &MarketData) -> Result<usize> {
        data.validate()?;
        let df = data.data();

        let symbols: Vec<Option<String>> = df
            .column("symbol")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|s: Option<&str>| s.map(|s| s.trim().to_string()))
            .collect();
        let dates = parse_dates(df.column("date")?)?;

        let keys: Vec<Option<(&str, Date)>> = symbols
            .iter()
            .zip(&dates)
            .map(|(s, d)| match (s, d) {
                (Some(s), Some(d)) if !s.is_empty() => Some((s.as_str(), *d)),
                _ => None,
            })
            .collect();

        let dropped = keys.iter().filter(|k| k.is_none()).count();
        if dropped > 0 {
            warn!(rows = dropped, "skipping rows without symbol or date");
        }

        let mut recorded = 0;
        for field in data.fields() {
            let values = df
                .column(field.as_str())?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            for (key, value) in keys.iter().zip(values.f64()?.into_iter()) {
                if let (Some((symbol, date)), Some(value)) = (key, value) {
                    if value.is_finite() {
                        recorded += 1;
                    }
                    self.observe(symbol, *date, field, value)?;
                }
            }
        }

        info!(
            rows = data.len(),
            observations = recorded,
            "loaded market data"
        );
        Ok(recorded)
    }
}

impl TimeSeriesStore {
    /// Build a store from a long-format frame with default settings.
    pub fn from_market_data(data: &MarketData) -> Result<Self> {
        let mut builder = Self::builder();
        builder.load_market_data(data)?;
        Ok(builder.build())
    }
}
