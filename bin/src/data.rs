//! File input and output for the ronda CLI.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use ronda_data::TimeSeriesStore;
use ronda_eval::BacktestConfig;
use ronda_traits::MarketData;
use tracing::info;

/// Read a long-format CSV (`symbol`, `date`, `price`, fundamentals...) into a
/// store.
pub(crate) fn load_store(path: &Path, liveness_tolerance_days: i64) -> Result<TimeSeriesStore> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("reading {}", path.display()))?;

    let mut builder = TimeSeriesStore::builder().liveness_tolerance_days(liveness_tolerance_days);
    builder.load_market_data(&MarketData::new(df))?;
    let store = builder.build();
    if let Some((first, last)) = store.date_range() {
        info!(instruments = store.len(), %first, %last, path = %path.display(), "store loaded");
    }
    Ok(store)
}

/// Load a JSON config, or the defaults when no path is given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<BacktestConfig> {
    match path {
        Some(path) => BacktestConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(BacktestConfig::default()),
    }
}

/// Write a frame as CSV, creating parent directories as needed.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    info!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ronda-cli-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_store_from_csv() {
        let dir = temp_dir("load");
        let path = dir.join("market.csv");
        std::fs::write(
            &path,
            "symbol,date,price,earnings_ttm\n\
             AAA,2024-01-31,10.0,1.0\n\
             AAA,2024-02-29,11.0,\n\
             BBB,2024-01-31,20.0,2.0\n",
        )
        .unwrap();

        let store = load_store(&path, 7).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.liveness_tolerance_days(), 7);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_write_csv() {
        let dir = temp_dir("write");
        let path = dir.join("out").join("frame.csv");
        let mut df = df! { "strategy" => &["momentum"], "sharpe" => &[0.5] }.unwrap();

        write_csv(&mut df, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("strategy,sharpe"));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = load_config(None).unwrap();
        assert_eq!(config, BacktestConfig::default());
    }
}
