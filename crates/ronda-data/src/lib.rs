#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # Example
//!
//! ```
//! use ronda_data::TimeSeriesStore;
//! use ronda_traits::Date;
//!
//! let mut builder = TimeSeriesStore::builder();
//! builder
//!     .monthly_prices("AAPL", Date::from_ymd_opt(2024, 1, 1).unwrap(), &[185.0, 181.0, 171.0])
//!     .unwrap();
//! let store = builder.build();
//!
//! let march = Date::from_ymd_opt(2024, 3, 31).unwrap();
//! assert!(store.universe(march).contains("AAPL"));
//! assert_eq!(store.month_end_price("AAPL", march).unwrap(), Some(171.0));
//! ```

mod loader;
mod store;
mod view;

pub use loader::{parse_date, parse_dates};
pub use store::{DEFAULT_LIVENESS_TOLERANCE_DAYS, Instrument, StoreBuilder, TimeSeriesStore};
pub use view::PointInTimeView;
