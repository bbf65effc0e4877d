#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the ronda factor backtester.
//!
//! This crate provides the foundational vocabulary shared by every stage of the
//! pipeline: instrument and date types, the observation field set, the error
//! taxonomy, cross-sectional statistics and month-end calendar arithmetic.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Days between 0001-01-01 (CE) and 1970-01-01, for polars `Date` columns.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

// Module declarations
pub mod calendar;
pub mod error;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, RondaError};
pub use types::{Date, Field, MarketData, Symbol};
