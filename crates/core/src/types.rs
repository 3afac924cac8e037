//! Core record types for the newscorr pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Ticker symbol, upper-cased.
pub type Symbol = String;

/// Normalize a ticker for joins between news and price data.
#[inline]
pub fn normalize_symbol(raw: &str) -> Symbol {
    raw.trim().to_ascii_uppercase()
}

/// A daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Exchange-local trading date.
    pub date: NaiveDate,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Split/dividend adjusted close, when the source provides it.
    pub adj_close: Option<f64>,
    /// Traded volume.
    pub volume: f64,
}

/// Chronologically ordered bars for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Ticker (file stem of the source CSV).
    pub symbol: Symbol,
    /// Bars with unique, ascending dates.
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Close prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series holds no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// A news headline row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Headline text.
    pub headline: String,
    /// Article link, if present.
    pub url: Option<String>,
    /// Publisher name.
    pub publisher: String,
    /// Publication time in the market timezone.
    pub published_at: NaiveDateTime,
    /// Market-local calendar date of publication.
    pub date: NaiveDate,
    /// Ticker the headline is about.
    pub stock: Symbol,
}

/// Technical indicators for one bar. `None` marks warm-up or undefined values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    /// Trading date of the bar.
    pub date: NaiveDate,
    /// Close price.
    pub close: f64,
    /// Simple moving average of closes.
    pub sma: Option<f64>,
    /// Exponential moving average of closes.
    pub ema: Option<f64>,
    /// Relative strength index in [0, 100].
    pub rsi: Option<f64>,
    /// Fast EMA minus slow EMA.
    pub macd: Option<f64>,
    /// EMA of the MACD line.
    pub macd_signal: Option<f64>,
    /// MACD line minus signal line.
    pub macd_hist: Option<f64>,
    /// Simple return versus the previous bar.
    pub daily_return: Option<f64>,
    /// Annualized rolling volatility of daily returns.
    pub volatility: Option<f64>,
}

/// Indicator rows for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolIndicators {
    /// Ticker.
    pub symbol: Symbol,
    /// One row per bar, in date order.
    pub rows: Vec<IndicatorRow>,
}

/// Polarity bucket of a headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// A headline with its polarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHeadline {
    pub date: NaiveDate,
    pub stock: Symbol,
    pub publisher: String,
    /// Compound polarity in [-1, 1].
    pub score: f64,
    pub label: SentimentLabel,
}

/// Mean headline polarity for one (date, ticker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub symbol: Symbol,
    pub mean_score: f64,
    pub headline_count: u32,
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

/// Daily sentiment paired with a daily return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedObservation {
    /// Sentiment date.
    pub date: NaiveDate,
    pub symbol: Symbol,
    pub sentiment: f64,
    pub headline_count: u32,
    /// Date of the bar the return belongs to (differs from `date` when lagged).
    pub return_date: NaiveDate,
    pub daily_return: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: None,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl "), "AAPL");
        assert_eq!(normalize_symbol("Tsla"), "TSLA");
    }

    #[test]
    fn test_series_helpers() {
        let series = PriceSeries {
            symbol: "AAPL".to_string(),
            bars: vec![bar("2020-01-02", 10.0), bar("2020-01-03", 11.0)],
        };
        assert_eq!(series.closes(), vec![10.0, 11.0]);
        assert_eq!(series.len(), 2);
        assert!(!series.is_empty());
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries {
            symbol: "X".to_string(),
            bars: Vec::new(),
        };
        assert!(series.is_empty());
        assert!(series.closes().is_empty());
    }

    #[test]
    fn test_label_serializes_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }
}
