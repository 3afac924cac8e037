//! Data ingestion and normalization for the newscorr pipeline.
//!
//! This crate handles:
//! - Per-ticker OHLCV CSV loading
//! - News headline CSV loading
//! - Timestamp parsing and market timezone normalization

pub mod dates;
pub mod news;
pub mod prices;

pub use dates::{parse_bar_date, parse_market_timestamp};
pub use news::{NewsLoadStats, NewsLoader};
pub use prices::{load_price_dir, load_price_file};
