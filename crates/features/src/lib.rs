//! Feature computation for the newscorr pipeline.
//!
//! This crate handles:
//! - Technical indicators (SMA, EMA, RSI, MACD) under two conventions
//! - Rolling means and rolling volatility
//! - Daily returns
//! - Headline sentiment scoring and daily aggregation

pub mod engine;
pub mod indicators;
pub mod returns;
pub mod rolling;
pub mod sentiment;

pub use engine::IndicatorEngine;
pub use indicators::Macd;
pub use rolling::{RollingMean, RollingVolatility};
pub use sentiment::{
    aggregate_daily, score_headlines, SentimentScorer, SentimentThresholds, VaderScorer,
};
